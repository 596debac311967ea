//! Image payloads and the remote generation service.

mod gemini;
mod provider;
mod types;

pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiModel, DEFAULT_BASE_URL};
pub use provider::{
    Candidate, GenerateContent, GenerateRequest, GenerateResponse, Modality, RemoteFailure,
    ResponsePart,
};
pub use types::{ImageFormat, ImagePayload};
