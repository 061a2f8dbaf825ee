//! Classify: optional text style inference for new text regions.
//!
//! DESIGN
//! ======
//! A snapshot of the page under a freshly drawn region is sent to a vision
//! model, which replies with font size, family and weight. Classification is
//! advisory: any failure is logged and the draft keeps its sampled defaults.

pub mod config;
pub mod gemini;
pub mod types;

pub use config::ClassifierConfig;
pub use gemini::GeminiClient;
pub use types::{ClassifyError, StyleClassifier, StyleHints, StyleRequest};

use crate::error::ErrorCode;

/// Run a classification, swallowing failures.
pub async fn suggest_style(classifier: &dyn StyleClassifier, request: &StyleRequest) -> Option<StyleHints> {
    match classifier.classify(request).await {
        Ok(hints) => Some(hints),
        Err(e) => {
            tracing::warn!(session = request.session, error = %e, code = e.error_code(), "style classification failed");
            None
        }
    }
}
