use std::process::ExitCode;

use pagemark::classify::{ClassifierConfig, GeminiClient, StyleClassifier};
use pagemark::error::ErrorCode;

/// Check that the style classifier is configured and reachable.
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let config = match ClassifierConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), "classifier not configured");
            println!("style classifier: not configured ({e})");
            return ExitCode::FAILURE;
        }
    };
    let client = match GeminiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            println!("style classifier: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(model = client.model(), "probing style classifier");
    match client.probe().await {
        Ok(reply) => {
            println!("style classifier: ok ({}): {}", client.model(), reply.trim());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), retryable = e.retryable(), "probe failed");
            println!("style classifier: {e}");
            ExitCode::FAILURE
        }
    }
}
