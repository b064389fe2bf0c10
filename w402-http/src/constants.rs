//! HTTP-specific constants for the x402 protocol.

pub use w402::proto::{PAYMENT_REQUIRED_HEADER, PAYMENT_SIGNATURE_HEADER, X_PAYMENT_HEADER};

/// Header carrying a V2 settlement receipt (server to client).
pub const PAYMENT_RESPONSE_HEADER: &str = "PAYMENT-RESPONSE";

/// Header carrying a V1 settlement receipt (server to client).
pub const X_PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";
