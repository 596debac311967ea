//! The remote generation service boundary.

use crate::credential::Credential;
use crate::image::types::ImagePayload;
use async_trait::async_trait;

/// Response content the model is allowed to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modality {
    /// Inline image data.
    Image,
    /// Plain text.
    Text,
}

impl Modality {
    /// Returns the wire name of this modality.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Text => "TEXT",
        }
    }
}

/// A single generate call: one image attachment plus one instruction.
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    /// The photo to restyle, sent as inline data.
    pub image: &'a ImagePayload,
    /// Natural-language instruction sent after the image.
    pub instruction: &'a str,
    /// Modalities the response may contain.
    pub response_modalities: &'a [Modality],
}

impl<'a> GenerateRequest<'a> {
    /// Builds a request allowing both image and text in the response.
    pub fn new(image: &'a ImagePayload, instruction: &'a str) -> Self {
        Self {
            image,
            instruction,
            response_modalities: &[Modality::Image, Modality::Text],
        }
    }
}

/// One returned content part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Inline binary data with its MIME type.
    Binary(ImagePayload),
    /// Text produced by the model.
    Text(String),
}

impl ResponsePart {
    /// Returns true for inline binary parts.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Returns the payload of a binary part.
    pub fn into_binary(self) -> Option<ImagePayload> {
        match self {
            Self::Binary(image) => Some(image),
            Self::Text(_) => None,
        }
    }

    /// Returns the text of a non-empty text part.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// One response candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    /// Content parts in the order the model returned them.
    pub parts: Vec<ResponsePart>,
}

/// A decoded response from the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResponse {
    /// Set when the provider's safety system blocked the prompt.
    pub block_reason: Option<String>,
    /// Response candidates, best first.
    pub candidates: Vec<Candidate>,
}

/// A transport or protocol level failure, carrying the message to classify.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RemoteFailure(pub String);

/// Trait for services that turn an image and an instruction into content.
#[async_trait]
pub trait GenerateContent: Send + Sync {
    /// Issues exactly one request and waits for its full response.
    async fn generate_content(
        &self,
        credential: &Credential,
        request: GenerateRequest<'_>,
    ) -> std::result::Result<GenerateResponse, RemoteFailure>;

    /// Returns the model identifier used for requests.
    fn model(&self) -> &str;
}
