//! The transform request pipeline.
//!
//! [`transform`] validates its input, issues exactly one remote call through
//! a [`GenerateContent`] implementation and maps the outcome onto
//! [`PhotoStyleError`]. There are no retries and no local fallback.

use crate::credential::TransformConfig;
use crate::error::{PhotoStyleError, Result};
use crate::image::{GenerateContent, GenerateRequest, GenerateResponse, ImagePayload, ResponsePart};
use crate::style::StyleId;

/// What a scan of the returned parts found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartScan {
    /// The first inline binary part.
    Image(ImagePayload),
    /// No binary part; the non-empty text parts joined by newlines.
    Text(String),
    /// Neither binary nor text content.
    Empty,
}

/// Picks the first binary part, or else the newline-joined text parts.
///
/// Parts after the first binary one are not inspected.
pub fn scan_parts(mut parts: Vec<ResponsePart>) -> PartScan {
    if let Some(image) = parts
        .iter()
        .position(ResponsePart::is_binary)
        .and_then(|index| parts.swap_remove(index).into_binary())
    {
        return PartScan::Image(image);
    }

    // No binary part, so every remaining part is text.
    let text = parts
        .into_iter()
        .filter_map(ResponsePart::into_text)
        .collect::<Vec<_>>()
        .join("\n");

    if text.is_empty() {
        PartScan::Empty
    } else {
        PartScan::Text(text)
    }
}

/// Interprets a decoded response.
///
/// A block reason wins over any content. Only the first candidate is read.
pub fn interpret_response(response: GenerateResponse) -> Result<ImagePayload> {
    if let Some(reason) = response.block_reason {
        return Err(PhotoStyleError::ContentBlocked(reason));
    }

    let parts = response
        .candidates
        .into_iter()
        .next()
        .map(|candidate| candidate.parts)
        .unwrap_or_default();

    match scan_parts(parts) {
        PartScan::Image(image) => Ok(image),
        PartScan::Text(text) => Err(PhotoStyleError::NoImageReturned(text)),
        PartScan::Empty => Err(PhotoStyleError::EmptyResponse),
    }
}

/// Restyles `image` according to `instruction`.
///
/// Fails with [`PhotoStyleError::MissingCredential`] before any remote call
/// when `config` carries no key. The returned payload's MIME type comes from
/// the response, never from the input.
pub async fn transform<C>(
    client: &C,
    image: &ImagePayload,
    instruction: &str,
    config: &TransformConfig,
) -> Result<ImagePayload>
where
    C: GenerateContent + ?Sized,
{
    let credential = config
        .credential
        .as_ref()
        .ok_or(PhotoStyleError::MissingCredential)?;

    let request = GenerateRequest::new(image, instruction);

    let outcome = match client.generate_content(credential, request).await {
        Ok(response) => interpret_response(response),
        Err(failure) => Err(PhotoStyleError::from_remote_message(failure.0)),
    };

    match &outcome {
        Ok(generated) => tracing::debug!(
            model = client.model(),
            mime_type = %generated.mime_type,
            size_bytes = generated.size(),
            "image transform complete"
        ),
        Err(e) => tracing::warn!(model = client.model(), kind = ?e.kind(), "image transform failed: {e}"),
    }

    outcome
}

/// Restyles `image` with one of the preset styles.
pub async fn transform_with_style<C>(
    client: &C,
    image: &ImagePayload,
    style: StyleId,
    config: &TransformConfig,
) -> Result<ImagePayload>
where
    C: GenerateContent + ?Sized,
{
    transform(client, image, style.instruction(), config).await
}
