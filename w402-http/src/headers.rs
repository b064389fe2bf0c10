//! Decoding of x402 challenge and receipt headers.
//!
//! Header names are matched case-insensitively, as [`HeaderMap`] does.

use http::HeaderMap;
use w402::proto::{PaymentRequired, ProtocolError};

use crate::constants::{PAYMENT_REQUIRED_HEADER, PAYMENT_RESPONSE_HEADER, X_PAYMENT_RESPONSE_HEADER};

/// Decodes the challenge of a 402 response.
///
/// The `PAYMENT-REQUIRED` header (V2) wins; the JSON body (V1, or V2 servers
/// that put the challenge in the body) is the fallback. A malformed header is
/// only reported when the body does not hold a challenge either.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingChallenge`] when neither source is present,
/// or the decoding error of the source that was tried last.
pub fn parse_challenge(headers: &HeaderMap, body: &[u8]) -> Result<PaymentRequired, ProtocolError> {
    let from_header = headers
        .get(PAYMENT_REQUIRED_HEADER)
        .map(|value| PaymentRequired::from_header(value.as_bytes()));

    match from_header {
        Some(Ok(challenge)) => Ok(challenge),
        Some(Err(header_err)) => {
            if body.trim_ascii().is_empty() {
                return Err(header_err);
            }
            PaymentRequired::from_slice(body).map_err(|_| header_err)
        }
        None if body.trim_ascii().is_empty() => Err(ProtocolError::MissingChallenge),
        None => PaymentRequired::from_slice(body),
    }
}

/// Returns a header value as text, replacing invalid UTF-8.
#[must_use]
pub fn header_text(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

/// Settlement receipts a resource server attached to its response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentReceipts {
    /// Value of the `PAYMENT-RESPONSE` header.
    pub payment_response: Option<String>,
    /// Value of the `X-PAYMENT-RESPONSE` header.
    pub x_payment_response: Option<String>,
}

impl PaymentReceipts {
    /// Extracts both receipt headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            payment_response: header_text(headers, PAYMENT_RESPONSE_HEADER),
            x_payment_response: header_text(headers, X_PAYMENT_RESPONSE_HEADER),
        }
    }
}
