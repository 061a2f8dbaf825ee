//! Classifier configuration parsed from environment variables.

use super::types::ClassifyError;

pub const API_KEY_VAR: &str = "PAGEMARK_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Keys shorter than this are treated as not configured.
pub const MIN_API_KEY_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeouts: ClassifierTimeouts,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

/// Whether a stored key looks real enough to try.
#[must_use]
pub fn is_configured(api_key: &str) -> bool {
    api_key.trim().len() >= MIN_API_KEY_LEN
}

impl ClassifierConfig {
    /// Build typed classifier config from environment variables.
    ///
    /// Required:
    /// - `PAGEMARK_API_KEY`
    ///
    /// Optional:
    /// - `PAGEMARK_MODEL`: default `gemini-2.0-flash`
    /// - `PAGEMARK_API_BASE_URL`: default Generative Language v1beta endpoint
    /// - `PAGEMARK_REQUEST_TIMEOUT_SECS`: default 60
    /// - `PAGEMARK_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::MissingApiKey`] if the key is absent or too short.
    pub fn from_env() -> Result<Self, ClassifyError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::MissingApiKey`] if the key is absent or too short.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClassifyError> {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_owned())
            .filter(|k| is_configured(k))
            .ok_or_else(|| ClassifyError::MissingApiKey { var: API_KEY_VAR.into() })?;

        let model = lookup("PAGEMARK_MODEL")
            .map(|m| m.trim().to_owned())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
        let base_url = lookup("PAGEMARK_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let timeouts = ClassifierTimeouts {
            request_secs: parse_u64(lookup("PAGEMARK_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("PAGEMARK_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_key, model, base_url, timeouts })
    }
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.map_or(default, |v| v.trim().parse::<u64>().unwrap_or(default))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
