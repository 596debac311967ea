//! Interactive session state.
//!
//! Tracks one photo through idle → image selected → transforming →
//! completed/failed. Only one transform may be pending at a time.

use crate::error::{PhotoStyleError, Result};
use crate::image::ImagePayload;
use crate::style::{Accent, StyleDescriptor, StyleId, DEFAULT_ACCENT};

/// Progress messages shown while a transform is pending.
pub const LOADING_MESSAGES: [&str; 4] = [
    "The AI is getting creative...",
    "Applying a great new style...",
    "Polishing every pixel...",
    "Almost there, hang on a moment!",
];

/// Where a session currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing selected yet.
    #[default]
    Idle,
    /// A photo is ready and no style has been applied.
    ImageSelected {
        /// The selected photo.
        original: ImagePayload,
    },
    /// A transform request is pending.
    Transforming {
        /// The selected photo.
        original: ImagePayload,
        /// The style being applied.
        style: StyleId,
    },
    /// The last transform succeeded.
    Completed {
        /// The selected photo.
        original: ImagePayload,
        /// The style that was applied.
        style: StyleId,
        /// The generated image.
        generated: ImagePayload,
    },
    /// The last transform failed.
    Failed {
        /// The selected photo.
        original: ImagePayload,
        /// The style that was attempted.
        style: StyleId,
        /// User-facing error message.
        message: String,
    },
}

/// A request the caller should send through the pipeline.
#[derive(Debug, Clone)]
pub struct PendingTransform {
    /// Photo to send.
    pub image: ImagePayload,
    /// Style being applied.
    pub style: &'static StyleDescriptor,
}

/// One interactive session.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    /// Creates an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns true while a transform is pending.
    pub fn is_transforming(&self) -> bool {
        matches!(self.state, SessionState::Transforming { .. })
    }

    /// Returns the selected photo, if any.
    pub fn original(&self) -> Option<&ImagePayload> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::ImageSelected { original }
            | SessionState::Transforming { original, .. }
            | SessionState::Completed { original, .. }
            | SessionState::Failed { original, .. } => Some(original),
        }
    }

    /// Returns the accent to show while loading.
    pub fn accent(&self) -> Accent {
        match &self.state {
            SessionState::Transforming { style, .. } => style.descriptor().accent,
            _ => DEFAULT_ACCENT,
        }
    }

    /// Selects a new photo, discarding any previous result.
    pub fn select_image(&mut self, image: ImagePayload) -> Result<()> {
        if self.is_transforming() {
            return Err(PhotoStyleError::InvalidInput(
                "cannot select a new image while a transform is pending".into(),
            ));
        }
        self.state = SessionState::ImageSelected { original: image };
        Ok(())
    }

    /// Starts applying `style` to the selected photo.
    ///
    /// Allowed once a photo is selected, including after a previous result
    /// or failure. Refused while another transform is pending.
    pub fn begin(&mut self, style: StyleId) -> Result<PendingTransform> {
        let original = match std::mem::take(&mut self.state) {
            SessionState::ImageSelected { original }
            | SessionState::Completed { original, .. }
            | SessionState::Failed { original, .. } => original,
            other => {
                let reason = if matches!(other, SessionState::Idle) {
                    "no image selected"
                } else {
                    "a transform is already pending"
                };
                self.state = other;
                return Err(PhotoStyleError::InvalidInput(reason.into()));
            }
        };

        self.state = SessionState::Transforming {
            original: original.clone(),
            style,
        };
        Ok(PendingTransform {
            image: original,
            style: style.descriptor(),
        })
    }

    /// Records the outcome of the pending transform.
    ///
    /// A result arriving after a reset or a new selection is dropped and
    /// `false` is returned.
    pub fn finish(&mut self, outcome: Result<ImagePayload>) -> bool {
        let (original, style) = match std::mem::take(&mut self.state) {
            SessionState::Transforming { original, style } => (original, style),
            other => {
                tracing::debug!("ignoring late transform result");
                self.state = other;
                return false;
            }
        };

        self.state = match outcome {
            Ok(generated) => SessionState::Completed {
                original,
                style,
                generated,
            },
            Err(e) => SessionState::Failed {
                original,
                style,
                message: e.to_string(),
            },
        };
        true
    }

    /// Returns to idle, dropping the photo and any result.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

/// Picks the progress message for the given tick.
pub fn loading_message(tick: usize) -> &'static str {
    LOADING_MESSAGES[tick % LOADING_MESSAGES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> ImagePayload {
        ImagePayload::from_camera_frame(vec![0xFF, 0xD8, 0xFF])
    }

    #[test]
    fn test_happy_path() {
        let mut session = Session::new();
        assert_eq!(session.state(), &SessionState::Idle);

        session.select_image(photo()).unwrap();
        let pending = session.begin(StyleId::Disney).unwrap();
        assert_eq!(pending.image, photo());
        assert_eq!(pending.style.id, StyleId::Disney);
        assert!(session.is_transforming());
        assert_eq!(session.accent(), StyleId::Disney.descriptor().accent);

        let generated = ImagePayload::new(vec![1], "image/png");
        assert!(session.finish(Ok(generated.clone())));
        assert_eq!(
            session.state(),
            &SessionState::Completed {
                original: photo(),
                style: StyleId::Disney,
                generated,
            }
        );
    }

    #[test]
    fn test_begin_requires_image() {
        let mut session = Session::new();
        assert!(session.begin(StyleId::Cartoon).is_err());
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_begin_refused_while_pending() {
        let mut session = Session::new();
        session.select_image(photo()).unwrap();
        session.begin(StyleId::Cartoon).unwrap();

        assert!(session.begin(StyleId::ThreeD).is_err());
        assert!(session.select_image(photo()).is_err());
        assert!(session.is_transforming());
    }

    #[test]
    fn test_failure_keeps_photo_and_allows_retry() {
        let mut session = Session::new();
        session.select_image(photo()).unwrap();
        session.begin(StyleId::ThreeD).unwrap();
        session.finish(Err(PhotoStyleError::EmptyResponse));

        match session.state() {
            SessionState::Failed { message, style, .. } => {
                assert_eq!(message, "API did not return a valid image");
                assert_eq!(*style, StyleId::ThreeD);
            }
            other => panic!("unexpected state: {other:?}"),
        }

        assert_eq!(session.original(), Some(&photo()));
        assert!(session.begin(StyleId::Caricature).is_ok());
    }

    #[test]
    fn test_late_result_after_reset_is_ignored() {
        let mut session = Session::new();
        session.select_image(photo()).unwrap();
        session.begin(StyleId::OutFocusing).unwrap();
        session.reset();

        assert!(!session.finish(Ok(ImagePayload::new(vec![1], "image/png"))));
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.accent(), DEFAULT_ACCENT);
    }

    #[test]
    fn test_loading_message_rotates() {
        assert_eq!(loading_message(0), LOADING_MESSAGES[0]);
        assert_eq!(loading_message(5), LOADING_MESSAGES[1]);
    }
}
