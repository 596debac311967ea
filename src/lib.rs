#![warn(missing_docs)]
//! photostyle - restyle photos with Gemini image models.
//!
//! A photo plus one of five preset style instructions is sent to Gemini in a
//! single `generateContent` call. The outcome is either the generated image
//! or a classified [`PhotoStyleError`].
//!
//! # Quick Start
//!
//! ```no_run
//! use photostyle::{transform_with_style, GeminiClient, ImagePayload, StyleId, TransformConfig};
//!
//! #[tokio::main]
//! async fn main() -> photostyle::Result<()> {
//!     let client = GeminiClient::builder().build();
//!     let config = TransformConfig::new(std::env::var("GOOGLE_API_KEY").unwrap_or_default());
//!     let photo = ImagePayload::from_file("me.jpg")?;
//!
//!     let styled = transform_with_style(&client, &photo, StyleId::Disney, &config).await?;
//!     styled.save(styled.download_file_name(0))?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `photostyle` command-line binary

mod credential;
mod error;
pub mod image;
pub mod pipeline;
pub mod session;
pub mod style;

// Re-export error types at crate root
pub use error::{ErrorKind, PhotoStyleError, Result};

pub use credential::{Credential, CredentialStore, TransformConfig, API_KEY_ENV_VAR};
pub use image::{
    GeminiClient, GeminiClientBuilder, GeminiModel, GenerateContent, ImageFormat, ImagePayload,
};
pub use pipeline::{transform, transform_with_style};
pub use session::{Session, SessionState};
pub use style::{catalog, StyleDescriptor, StyleId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::credential::{Credential, TransformConfig};
    pub use crate::error::{PhotoStyleError, Result};
    pub use crate::image::{GeminiClient, GenerateContent, ImagePayload};
    pub use crate::pipeline::{transform, transform_with_style};
    pub use crate::style::StyleId;
}
