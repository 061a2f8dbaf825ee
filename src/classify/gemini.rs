//! Gemini `generateContent` client for style inference.
//!
//! One request per snapshot: a text prompt plus the PNG as inline data. The
//! reply text is handed to [`parse_style_reply`].

use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::config::ClassifierConfig;
use super::types::{ClassifyError, RejectReason, StyleClassifier, StyleHints, StyleRequest, parse_style_reply};

const PROBE_PROMPT: &str = "Say \"Hello\" in Turkish.";
const PNG_MIME: &str = "image/png";

/// Prompt asking for the typography of a `width` x `height` snapshot.
#[must_use]
pub fn style_prompt(width: u32, height: u32) -> String {
    format!(
        "You are a typography expert. Analyze the text in this {width}x{height} pixel image and estimate \
         its font size in pixels, its font family, and whether it is bold or italic. \
         Respond ONLY with JSON of the form \
         {{\"fontSize\": number, \"fontFamily\": \"string\", \"bold\": boolean, \"italic\": boolean}}."
    )
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`ClassifyError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ClassifyError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, body: &GenerateRequest) -> Result<String, ClassifyError> {
        let url = format!("{}/models/{}:generateContent", self.config.base_url, self.config.model);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| ClassifyError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClassifyError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(match RejectReason::from_status(status) {
                Some(reason) => ClassifyError::Rejected { status, reason },
                None => ClassifyError::ApiResponse { status, body: text },
            });
        }
        parse_response(&text)
    }
}

#[async_trait::async_trait]
impl StyleClassifier for GeminiClient {
    async fn classify(&self, request: &StyleRequest) -> Result<StyleHints, ClassifyError> {
        let body = build_style_request(request);
        let reply = self.generate(&body).await?;
        tracing::debug!(session = request.session, reply_len = reply.len(), "style reply received");
        Ok(parse_style_reply(&reply))
    }

    async fn probe(&self) -> Result<String, ClassifyError> {
        let body = GenerateRequest { contents: vec![WireContent { parts: vec![WirePart::Text { text: PROBE_PROMPT.into() }] }] };
        self.generate(&body).await
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest {
    contents: Vec<WireContent>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

pub(crate) fn build_style_request(request: &StyleRequest) -> GenerateRequest {
    let data = base64::engine::general_purpose::STANDARD.encode(&request.png);
    GenerateRequest {
        contents: vec![WireContent {
            parts: vec![
                WirePart::Text { text: style_prompt(request.width, request.height) },
                WirePart::InlineData { inline_data: InlineData { mime_type: PNG_MIME, data } },
            ],
        }],
    }
}

/// Extract the first candidate's first text part.
pub(crate) fn parse_response(json: &str) -> Result<String, ClassifyError> {
    let resp: GenerateResponse = serde_json::from_str(json).map_err(|e| ClassifyError::ApiParse(e.to_string()))?;
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(ClassifyError::EmptyResponse)
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
