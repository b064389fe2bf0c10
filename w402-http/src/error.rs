//! Error types for the HTTP transport layer.

/// Errors raised while setting up the HTTP client.
///
/// Request-time failures never surface as errors; they are classified into
/// an [`Outcome`](crate::Outcome) instead.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The underlying reqwest client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
