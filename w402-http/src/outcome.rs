//! Classification of a finished request.
//!
//! Only a final `402 Payment Required` and errors without a usable body are
//! failures. Every other status, including 4xx and 5xx, is a success whose
//! body is passed through.

use std::error::Error as StdError;

use http::{HeaderMap, StatusCode};
use reqwest_middleware as rqm;

use crate::client::PaymentDeclined;

/// A response whose body was read in full.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    /// Final HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// Everything known about a request that did not succeed.
#[derive(Debug, Clone)]
pub struct ExecutionFailure {
    /// Status of the response, if one arrived.
    pub status: Option<StatusCode>,
    /// Headers of the response, if one arrived.
    pub headers: Option<HeaderMap>,
    /// Body of the response, if it could be read.
    pub body: Option<Vec<u8>>,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Terminal state of one payment-aware request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The server answered with something other than 402.
    Succeeded(UpstreamResponse),
    /// The request failed or still required payment.
    Failed(ExecutionFailure),
}

impl Outcome {
    /// Classifies a response whose body was read.
    ///
    /// `declined` is the reason negotiation was abandoned, when the
    /// middleware handed the original 402 back.
    #[must_use]
    pub fn from_response(response: UpstreamResponse, declined: Option<&PaymentDeclined>) -> Self {
        if response.status != StatusCode::PAYMENT_REQUIRED {
            return Self::Succeeded(response);
        }
        let message = match declined {
            Some(PaymentDeclined(reason)) => format!("payment required: {reason}"),
            None => "payment required: the resource server rejected the payment".to_owned(),
        };
        Self::Failed(ExecutionFailure {
            status: Some(response.status),
            headers: Some(response.headers),
            body: Some(response.body),
            message,
        })
    }

    /// Classifies an error raised before any response arrived.
    #[must_use]
    pub fn from_transport_error(err: &rqm::Error) -> Self {
        Self::Failed(ExecutionFailure {
            status: None,
            headers: None,
            body: None,
            message: describe_error(err),
        })
    }

    /// Classifies a response whose body could not be read.
    #[must_use]
    pub fn from_body_error(status: StatusCode, headers: HeaderMap, err: &reqwest::Error) -> Self {
        Self::from_unread_body(status, headers, &error_chain(err))
    }

    /// Classifies a response whose body was lost, given the read error text.
    #[must_use]
    pub fn from_unread_body(status: StatusCode, headers: HeaderMap, detail: &str) -> Self {
        Self::Failed(ExecutionFailure {
            status: Some(status),
            headers: Some(headers),
            body: None,
            message: format!("failed to read response body: {detail}"),
        })
    }

    /// Returns `true` for [`Outcome::Succeeded`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Returns the status of the response, if one arrived.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Succeeded(response) => Some(response.status),
            Self::Failed(failure) => failure.status,
        }
    }

    /// Returns the response headers, if a response arrived.
    #[must_use]
    pub const fn headers(&self) -> Option<&HeaderMap> {
        match self {
            Self::Succeeded(response) => Some(&response.headers),
            Self::Failed(failure) => failure.headers.as_ref(),
        }
    }
}

fn describe_error(err: &rqm::Error) -> String {
    match err {
        rqm::Error::Reqwest(e) if e.is_timeout() => {
            format!("request timed out: {}", error_chain(e))
        }
        rqm::Error::Reqwest(e) => format!("request failed: {}", error_chain(e)),
        other => format!("request failed: {other}"),
    }
}

/// Joins an error with its sources, `outer: inner: root`.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> UpstreamResponse {
        UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers: HeaderMap::new(),
            body: b"{}".to_vec(),
        }
    }

    #[test]
    fn test_non_402_statuses_succeed() {
        for status in [200, 204, 301, 404, 500, 503] {
            let outcome = Outcome::from_response(response(status), None);
            assert!(outcome.is_success(), "status {status}");
            assert_eq!(outcome.status().map(|s| s.as_u16()), Some(status));
        }
    }

    #[test]
    fn test_final_402_fails_with_response() {
        let declined = PaymentDeclined("no registered signer".into());
        let Outcome::Failed(failure) = Outcome::from_response(response(402), Some(&declined))
        else {
            panic!("expected failure");
        };
        assert_eq!(failure.status, Some(StatusCode::PAYMENT_REQUIRED));
        assert_eq!(failure.body.as_deref(), Some(&b"{}"[..]));
        assert!(failure.headers.is_some());
        assert_eq!(failure.message, "payment required: no registered signer");
    }

    #[test]
    fn test_rejected_payment_message() {
        let Outcome::Failed(failure) = Outcome::from_response(response(402), None) else {
            panic!("expected failure");
        };
        assert!(failure.message.contains("rejected the payment"));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Inner;

    #[test]
    fn test_error_chain_joins_sources() {
        assert_eq!(error_chain(&Outer(Inner)), "outer: connection refused");
    }
}
