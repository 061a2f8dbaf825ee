//! Shared error classification.

/// Trait for typed errors that carry a stable machine-readable code.
///
/// Hosts surface `error_code()` next to the message so they can branch on the
/// failure class without parsing display strings.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Whether repeating the same operation may succeed.
    fn retryable(&self) -> bool {
        false
    }
}
