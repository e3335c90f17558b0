//! Gemini (Google) scene composition provider.

use crate::error::{parse_retry_after, sanitize_error_message, Result, SceneError};
use crate::image::{encoder, GeneratedImage};
use crate::scene::provider::SceneService;
use crate::scene::request::SceneRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    #[serde(rename = "gemini-2.5-flash-image")]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    #[serde(rename = "gemini-3-pro-image-preview")]
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL (e.g. for a proxy).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                SceneError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

/// Gemini scene composition provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn compose_impl(&self, request: &SceneRequest) -> Result<GeneratedImage> {
        let start = Instant::now();

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str()
        );
        let body = GeminiRequest::from_scene_request(request);

        tracing::debug!(model = %self.model, "sending scene request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let mut image = gemini_response.into_image()?;

        image.model = Some(self.model.as_str().to_string());
        image.duration_ms = Some(start.elapsed().as_millis() as u64);

        tracing::debug!(
            size = image.size(),
            duration_ms = ?image.duration_ms,
            "scene image received"
        );

        Ok(image)
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> SceneError {
    let message = GeminiErrorBody::message_from(text)
        .map(|m| sanitize_error_message(&m))
        .unwrap_or_else(|| sanitize_error_message(text));

    match status {
        401 | 403 => SceneError::Auth(message),
        404 => SceneError::InvalidRequest(
            "Model not found. Verify the model name is correct.".into(),
        ),
        429 => {
            let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
            SceneError::RateLimited {
                message,
                retry_after,
            }
        }
        _ => {
            let lower = message.to_lowercase();
            if lower.contains("safety")
                || lower.contains("blocked")
                || lower.contains("prohibited")
            {
                SceneError::ContentBlocked(message)
            } else {
                SceneError::Api { status, message }
            }
        }
    }
}

#[async_trait]
impl SceneService for GeminiProvider {
    async fn compose(&self, request: &SceneRequest) -> Result<GeneratedImage> {
        self.compose_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        match response.status().as_u16() {
            401 | 403 => Err(SceneError::Auth("Invalid API key".into())),
            404 => Err(SceneError::InvalidRequest(
                "Model not found. Verify the model name is correct.".into(),
            )),
            s if !(200..300).contains(&s) => Err(SceneError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
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

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<&'static str>,
}

impl GeminiRequest {
    fn from_scene_request(req: &SceneRequest) -> Self {
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: req.image.media_type.clone(),
                    data: req.image.payload.clone(),
                },
            },
            GeminiRequestPart::Text {
                text: req.prompt.clone(),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["TEXT", "IMAGE"],
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
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
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
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiErrorBody {
    fn message_from(text: &str) -> Option<String> {
        serde_json::from_str::<Self>(text)
            .ok()
            .map(|body| body.error.message)
    }
}

impl GeminiResponse {
    /// Picks the first inline image part of the first candidate.
    fn into_image(self) -> Result<GeneratedImage> {
        // Prompt blocks arrive as HTTP 200
        if let Some(feedback) = self.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                let msg = feedback
                    .block_reason_message
                    .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
                return Err(SceneError::ContentBlocked(msg));
            }
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(SceneError::NoImage)?;

        if let Some(ref finish_reason) = candidate.finish_reason {
            match finish_reason.as_str() {
                "SAFETY"
                | "IMAGE_SAFETY"
                | "IMAGE_PROHIBITED_CONTENT"
                | "IMAGE_RECITATION"
                | "RECITATION"
                | "PROHIBITED_CONTENT"
                | "BLOCKLIST" => {
                    return Err(SceneError::ContentBlocked(format!(
                        "Content blocked by Gemini safety filter: {}",
                        finish_reason
                    )));
                }
                _ => {}
            }
        }

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let mut caption: Vec<String> = Vec::new();
        let mut found = None;
        for part in parts {
            if let Some(inline) = part.inline_data {
                if crate::image::is_image_media_type(&inline.mime_type) {
                    found = Some(inline);
                    break;
                }
            }
            if let Some(text) = part.text {
                caption.push(text);
            }
        }

        let inline = found.ok_or(SceneError::NoImage)?;
        let data = encoder::decode_payload(&inline.data)?;

        let mut image = GeneratedImage::new(data, inline.mime_type);
        if !caption.is_empty() {
            image.caption = Some(caption.join("\n"));
        }
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::EncodedImage;

    fn request() -> SceneRequest {
        SceneRequest::new(EncodedImage {
            media_type: "image/png".into(),
            payload: "iVBORw0KGgo=".into(),
        })
    }

    #[test]
    fn test_gemini_model_as_str() {
        assert_eq!(GeminiModel::NanoBanana.as_str(), "gemini-2.5-flash-image");
        assert_eq!(
            GeminiModel::NanoBananaPro.as_str(),
            "gemini-3-pro-image-preview"
        );
        assert_eq!(GeminiModel::default(), GeminiModel::NanoBanana);
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = GeminiProviderBuilder::new()
            .api_key("test-key")
            .model(GeminiModel::NanoBananaPro)
            .base_url("http://localhost:9999/v1beta/")
            .build()
            .unwrap();
        assert_eq!(provider.model(), GeminiModel::NanoBananaPro);
        assert_eq!(provider.base_url, "http://localhost:9999/v1beta");
    }

    #[test]
    fn test_request_image_part_precedes_text() {
        let json = serde_json::to_value(GeminiRequest::from_scene_request(&request())).unwrap();
        let parts = &json["contents"][0]["parts"];

        assert_eq!(parts.as_array().unwrap().len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "iVBORw0KGgo=");
        assert_eq!(parts[1]["text"], crate::scene::DEFAULT_SCENE_PROMPT);
        assert_eq!(
            json["generationConfig"]["responseModalities"],
            serde_json::json!(["TEXT", "IMAGE"])
        );
        assert!(json.get("generation_config").is_none());
    }

    #[test]
    fn test_text_then_image_uses_image_part() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your scene."},
                        {"inlineData": {"mimeType": "image/png", "data": "AAEC"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let image = resp.into_image().unwrap();

        assert_eq!(image.data, vec![0, 1, 2]);
        assert_eq!(image.media_type, "image/png");
        assert_eq!(image.caption.as_deref(), Some("Here is your scene."));
    }

    #[test]
    fn test_first_image_part_wins() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AAEC"}},
                        {"inlineData": {"mimeType": "image/png", "data": "AQID"}}
                    ]
                }
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let image = resp.into_image().unwrap();
        assert_eq!(image.media_type, "image/jpeg");
        assert_eq!(image.data, vec![0, 1, 2]);
    }

    #[test]
    fn test_text_only_response_is_no_image() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I can't help with that."}]},
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(resp.into_image(), Err(SceneError::NoImage)));
    }

    #[test]
    fn test_no_candidates_is_no_image() {
        let resp: GeminiResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(resp.into_image(), Err(SceneError::NoImage)));
    }

    #[test]
    fn test_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        match resp.into_image() {
            Err(SceneError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety")
            }
            other => panic!("expected ContentBlocked, got {other:?}"),
        }
    }

    #[test]
    fn test_safety_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            resp.into_image(),
            Err(SceneError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_parse_error_statuses() {
        let headers = reqwest::header::HeaderMap::new();
        let quota = r#"{"error": {"code": 400, "message": "quota exceeded"}}"#;

        match parse_error(400, quota, &headers) {
            SceneError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("expected Api, got {other:?}"),
        }
        assert!(matches!(
            parse_error(403, "denied", &headers),
            SceneError::Auth(_)
        ));
        assert!(matches!(
            parse_error(404, "", &headers),
            SceneError::InvalidRequest(_)
        ));
        assert!(matches!(
            parse_error(429, "", &headers),
            SceneError::RateLimited {
                retry_after: None,
                ..
            }
        ));
        assert!(matches!(
            parse_error(400, "request blocked by safety policy", &headers),
            SceneError::ContentBlocked(_)
        ));
    }

    #[test]
    fn test_quota_exhaustion_keeps_service_message() {
        let mut headers = reqwest::header::HeaderMap::new();
        let body = r#"{"error": {"code": 429, "message": "quota exceeded"}}"#;

        let err = parse_error(429, body, &headers);
        assert_eq!(err.to_string(), "rate limited: quota exceeded");

        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());
        match parse_error(429, body, &headers) {
            SceneError::RateLimited {
                message,
                retry_after,
            } => {
                assert_eq!(message, "quota exceeded");
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(12)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
