//! Errors raised while decoding challenges.

/// A 402 challenge could not be understood.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The `x402Version` field is absent.
    #[error("challenge has no x402Version field")]
    MissingVersion,

    /// The `x402Version` field is not 1 or 2.
    #[error("unsupported x402Version {0}")]
    InvalidVersion(String),

    /// Neither the `PAYMENT-REQUIRED` header nor the body carried a challenge.
    #[error("402 response carries no payment challenge")]
    MissingChallenge,

    /// The challenge is not valid JSON or does not match the wire format.
    #[error("malformed challenge: {0}")]
    Json(#[from] serde_json::Error),

    /// The `PAYMENT-REQUIRED` header is not valid base64.
    #[error("malformed challenge header: {0}")]
    Base64(#[from] base64::DecodeError),
}
