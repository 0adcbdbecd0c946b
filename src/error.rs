//! Shared error-code contract.
//!
//! Every layer keeps its own `thiserror` enum; this trait gives each variant a
//! stable grepable code so logs and the CLI can report failures uniformly.

/// Grepable error code and retryable flag for structured error reporting.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
