//! Classifier types: errors, requests, style hints, and reply parsing.

use serde::Serialize;

use crate::color::Rgb;
use crate::consts::{DEFAULT_FONT_SIZE, MAX_SUGGESTED_FONT_SIZE, MIN_SUGGESTED_FONT_SIZE};
use crate::error::ErrorCode;

// =============================================================================
// ERROR
// =============================================================================

/// Why the classifier service refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// 400: usually a malformed or wrong API key.
    BadRequest,
    /// 403: the key is not authorized for this API.
    Forbidden,
    /// 404: the model does not exist for this key.
    ModelNotFound,
    /// 429: quota exhausted.
    RateLimited,
}

impl RejectReason {
    #[must_use]
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::BadRequest),
            403 => Some(Self::Forbidden),
            404 => Some(Self::ModelNotFound),
            429 => Some(Self::RateLimited),
            _ => None,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BadRequest => "invalid request, the API key may be wrong",
            Self::Forbidden => "access denied, the API key is not authorized",
            Self::ModelNotFound => "model not found, check the API key",
            Self::RateLimited => "rate limit exceeded, wait a minute and retry",
        })
    }
}

/// Errors produced by style classifier operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The API key is absent or too short to be real.
    #[error("API key not configured: env var {var}")]
    MissingApiKey { var: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The HTTP request failed before a response arrived.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The service answered with one of the well-known refusal statuses.
    #[error("{reason} (status {status})")]
    Rejected { status: u16, reason: RejectReason },

    /// Any other non-success status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The response parsed but carried no candidate text.
    #[error("API returned an empty response")]
    EmptyResponse,

    /// The region snapshot could not be encoded.
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

impl ErrorCode for ClassifyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::Rejected { .. } => "E_API_REJECTED",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::EmptyResponse => "E_API_EMPTY",
            Self::Encode(_) => "E_SNAPSHOT_ENCODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::ApiRequest(_)
                | Self::Rejected { reason: RejectReason::RateLimited, .. }
                | Self::ApiResponse { status: 500..=599, .. }
        )
    }
}

// =============================================================================
// REQUEST / HINTS
// =============================================================================

/// A region snapshot submitted for style inference.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRequest {
    /// Edit session the request belongs to; results for a closed session are dropped.
    pub session: u64,
    /// PNG-encoded pixels under the region.
    pub png: Vec<u8>,
    /// Region size in base px, quoted in the prompt.
    pub width: u32,
    pub height: u32,
}

/// Style properties inferred from a snapshot. Absent fields leave the draft alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleHints {
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub color: Option<Rgb>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

fn clamp_font_size(size: f64) -> f64 {
    size.clamp(MIN_SUGGESTED_FONT_SIZE, MAX_SUGGESTED_FONT_SIZE)
}

/// The outermost `{ ... }` span of a reply, which may be wrapped in prose or fences.
fn json_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

fn first_integer(reply: &str) -> Option<f64> {
    let start = reply.find(|c: char| c.is_ascii_digit())?;
    let digits: String = reply[start..].chars().take_while(char::is_ascii_digit).collect();
    match digits.parse::<f64>() {
        Ok(n) => Some(n),
        Err(_) => None,
    }
}

fn hints_from_json(value: &serde_json::Value) -> Option<StyleHints> {
    let obj = value.as_object()?;
    let font_size = obj
        .get("fontSize")
        .and_then(serde_json::Value::as_f64)
        .filter(|s| *s > 0.0)
        .map(clamp_font_size);
    let font_family = obj
        .get("fontFamily")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_owned);
    let color = obj
        .get("color")
        .and_then(serde_json::Value::as_str)
        .filter(|c| c.starts_with('#'))
        .and_then(Rgb::from_hex);
    Some(StyleHints {
        font_size,
        font_family,
        color,
        bold: obj.get("bold").and_then(serde_json::Value::as_bool),
        italic: obj.get("italic").and_then(serde_json::Value::as_bool),
    })
}

/// Interpret a free-form classifier reply.
///
/// The JSON object is taken from the first `{` to the last `}`. If that does
/// not parse, only a font size is recovered: the first integer in the reply,
/// or the default size when there is none. Font sizes are clamped to 8..=72
/// and colours are accepted only in `#rrggbb` form.
#[must_use]
pub fn parse_style_reply(reply: &str) -> StyleHints {
    let parsed = json_span(reply).and_then(|span| match serde_json::from_str::<serde_json::Value>(span) {
        Ok(value) => hints_from_json(&value),
        Err(_) => None,
    });
    if let Some(hints) = parsed {
        return hints;
    }
    let size = first_integer(reply).unwrap_or(DEFAULT_FONT_SIZE);
    StyleHints { font_size: Some(clamp_font_size(size)), ..StyleHints::default() }
}

// =============================================================================
// CLASSIFIER TRAIT
// =============================================================================

/// Async style classifier. Enables mocking in tests.
#[async_trait::async_trait]
pub trait StyleClassifier: Send + Sync {
    /// Infer text style from a region snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassifyError`] if the request fails or the service refuses it.
    async fn classify(&self, request: &StyleRequest) -> Result<StyleHints, ClassifyError>;

    /// Send a trivial prompt to check the key and model. Returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Rejected`] for 400/403/404/429 and other
    /// variants for transport or parse failures.
    async fn probe(&self) -> Result<String, ClassifyError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
