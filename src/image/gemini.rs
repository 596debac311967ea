//! Gemini (Google) `generateContent` client.

use crate::credential::Credential;
use crate::error::sanitize_error_message;
use crate::image::provider::{
    Candidate, GenerateContent, GenerateRequest, GenerateResponse, RemoteFailure, ResponsePart,
};
use crate::image::types::ImagePayload;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image, preview endpoint.
    #[default]
    FlashImagePreview,
    /// Gemini 2.5 Flash Image, stable endpoint.
    FlashImage,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
            Self::FlashImage => "gemini-2.5-flash-image",
        }
    }
}

impl std::str::FromStr for GeminiModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gemini-2.5-flash-image-preview" | "preview" => Ok(Self::FlashImagePreview),
            "gemini-2.5-flash-image" | "stable" => Ok(Self::FlashImage),
            other => Err(format!("unknown Gemini model: {other}")),
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    model: GeminiModel,
    base_url: Option<String>,
    http: Option<reqwest::Client>,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API endpoint (proxies, tests).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Uses a preconfigured HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GeminiClient {
        GeminiClient {
            http: self.http.unwrap_or_default(),
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: self.model,
        }
    }
}

/// Client for the Gemini `generateContent` endpoint.
///
/// Holds no credential; the key is supplied per call.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: GeminiModel,
}

impl Default for GeminiClient {
    fn default() -> Self {
        GeminiClientBuilder::new().build()
    }
}

impl GeminiClient {
    /// Creates a new `GeminiClientBuilder`.
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model.as_str())
    }

    async fn generate_impl(
        &self,
        credential: &Credential,
        request: GenerateRequest<'_>,
    ) -> std::result::Result<GenerateResponse, RemoteFailure> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_generate_request(&request);

        tracing::debug!(
            model = self.model.as_str(),
            mime_type = %request.image.mime_type,
            image_bytes = request.image.size(),
            "sending generateContent request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| RemoteFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| RemoteFailure(format!("failed to decode Gemini response: {e}")))?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            candidates = gemini_response.candidates.len(),
            "generateContent response received"
        );

        gemini_response.into_generate_response()
    }

    /// Checks that the model is reachable with the given key.
    pub async fn health_check(
        &self,
        credential: &Credential,
    ) -> std::result::Result<(), RemoteFailure> {
        let response = self
            .http
            .get(self.model_url())
            .header("x-goog-api-key", credential.expose())
            .send()
            .await
            .map_err(|e| RemoteFailure(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(parse_error(status.as_u16(), &text))
    }
}

#[async_trait]
impl GenerateContent for GeminiClient {
    async fn generate_content(
        &self,
        credential: &Credential,
        request: GenerateRequest<'_>,
    ) -> std::result::Result<GenerateResponse, RemoteFailure> {
        self.generate_impl(credential, request).await
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }
}

/// Turns a non-2xx response into a failure message.
///
/// Prefers `error.message` from the JSON body so the wording Gemini uses for
/// a rejected key survives intact.
fn parse_error(status: u16, text: &str) -> RemoteFailure {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(text)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| text.trim().to_string());

    let message = sanitize_error_message(&message);
    if message.is_empty() {
        RemoteFailure(format!("HTTP {status}"))
    } else {
        RemoteFailure(format!("HTTP {status}: {message}"))
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<&'static str>,
}

impl GeminiRequest {
    fn from_generate_request(req: &GenerateRequest<'_>) -> Self {
        // Image first, instruction second.
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: req.image.mime_type.clone(),
                    data: req.image.to_base64(),
                },
            },
            GeminiRequestPart::Text {
                text: req.instruction.to_string(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: req.response_modalities.iter().map(|m| m.as_str()).collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl GeminiResponse {
    /// Converts the wire response.
    ///
    /// A block reason short-circuits before any candidate is read. Only the
    /// first candidate is converted, and only up to its first usable inline
    /// image, so later parts can never fail the call.
    fn into_generate_response(self) -> std::result::Result<GenerateResponse, RemoteFailure> {
        let block_reason = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .filter(|reason| !reason.is_empty());

        if block_reason.is_some() {
            return Ok(GenerateResponse {
                block_reason,
                candidates: Vec::new(),
            });
        }

        let candidates = match self.candidates.into_iter().next() {
            Some(candidate) => {
                let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
                vec![Candidate {
                    parts: convert_parts(parts)?,
                }]
            }
            None => Vec::new(),
        };

        Ok(GenerateResponse {
            block_reason: None,
            candidates,
        })
    }
}

/// Converts parts in order, stopping after the first usable inline image.
///
/// Only that image is base64-decoded.
fn convert_parts(
    parts: Vec<GeminiPartResponse>,
) -> std::result::Result<Vec<ResponsePart>, RemoteFailure> {
    let mut converted = Vec::new();
    for part in parts {
        match part.into_wire_part() {
            Some(WirePart::Inline(inline)) => {
                converted.push(ResponsePart::Binary(inline.decode()?));
                break;
            }
            Some(WirePart::Text(text)) => converted.push(ResponsePart::Text(text)),
            None => {}
        }
    }
    Ok(converted)
}

enum WirePart {
    Inline(InlineData),
    Text(String),
}

impl GeminiPartResponse {
    /// Inline data counts only when both its data and MIME type are present.
    fn into_wire_part(self) -> Option<WirePart> {
        match self.inline_data {
            Some(inline) if !inline.data.is_empty() && !inline.mime_type.is_empty() => {
                Some(WirePart::Inline(inline))
            }
            _ => self.text.map(WirePart::Text),
        }
    }
}

impl InlineData {
    fn decode(self) -> std::result::Result<ImagePayload, RemoteFailure> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| RemoteFailure(format!("failed to decode image data: {e}")))?;
        Ok(ImagePayload::new(data, self.mime_type))
    }
}
