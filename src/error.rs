//! Error types for photo style transforms.

/// Case-insensitive marker Gemini puts in the message of a rejected key.
const INVALID_KEY_SIGNATURE: &str = "api key not valid";

/// Errors that can occur while restyling a photo.
#[derive(Debug, thiserror::Error)]
pub enum PhotoStyleError {
    /// No API key was supplied; the remote service was not contacted.
    #[error("no API key provided")]
    MissingCredential,

    /// The remote service rejected the API key.
    #[error("API key is not valid, check it and try again")]
    InvalidCredential,

    /// The request was blocked by the provider's safety system.
    #[error("request blocked by safety settings: {0}")]
    ContentBlocked(String),

    /// The model answered with text only.
    #[error("API did not return an image, it returned this text instead: \"{0}\"")]
    NoImageReturned(String),

    /// The model answered with neither an image nor text.
    #[error("API did not return a valid image")]
    EmptyResponse,

    /// Any other transport or protocol failure.
    #[error("image transform failed: {0}")]
    RemoteCallFailed(String),

    /// Bad input outside the remote call (unsupported file, misuse of a session).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O error (reading a photo, saving a result, credential file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tag identifying the class of a [`PhotoStyleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`PhotoStyleError::MissingCredential`].
    MissingCredential,
    /// See [`PhotoStyleError::InvalidCredential`].
    InvalidCredential,
    /// See [`PhotoStyleError::ContentBlocked`].
    ContentBlocked,
    /// See [`PhotoStyleError::NoImageReturned`].
    NoImageReturned,
    /// See [`PhotoStyleError::EmptyResponse`].
    EmptyResponse,
    /// See [`PhotoStyleError::RemoteCallFailed`].
    RemoteCallFailed,
    /// See [`PhotoStyleError::InvalidInput`].
    InvalidInput,
    /// See [`PhotoStyleError::Io`].
    Io,
}

impl PhotoStyleError {
    /// Reclassifies a transport or protocol failure message.
    ///
    /// Gemini exposes no structured code for a bad key, so this matches on
    /// the wording of its message.
    pub fn from_remote_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_lowercase().contains(INVALID_KEY_SIGNATURE) {
            Self::InvalidCredential
        } else {
            Self::RemoteCallFailed(message)
        }
    }

    /// Returns the kind tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential => ErrorKind::MissingCredential,
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::ContentBlocked(_) => ErrorKind::ContentBlocked,
            Self::NoImageReturned(_) => ErrorKind::NoImageReturned,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::RemoteCallFailed(_) => ErrorKind::RemoteCallFailed,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns true if the error came out of the transform pipeline
    /// rather than from local input or I/O.
    pub fn is_transform_failure(&self) -> bool {
        !matches!(self, Self::InvalidInput(_) | Self::Io(_))
    }
}

/// Replaces anything that looks like a Google API key in a provider error
/// message. The rest of the message is left untouched.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = String::with_capacity(message.len());
    let mut rest = message;

    while let Some(start) = rest.find("AIza") {
        let token = &rest[start..];
        let len = token
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(token.len());

        sanitized.push_str(&rest[..start]);
        if len >= 30 {
            sanitized.push_str("[REDACTED]");
        } else {
            sanitized.push_str(&token[..len]);
        }
        rest = &token[len..];
    }

    sanitized.push_str(rest);
    sanitized
}

/// Result type alias for photo style operations.
pub type Result<T> = std::result::Result<T, PhotoStyleError>;
