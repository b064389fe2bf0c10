//! The JSON envelope returned by every tool call.
//!
//! ```json
//! {
//!   "ok": true,
//!   "source": { "url": "http://localhost:4021", "path": "/weather" },
//!   "request": { "tool": "get-weather", "city": "Beijing" },
//!   "upstream": {
//!     "status": 200,
//!     "payment_response_header": null,
//!     "x_payment_response_header": "eyJzdWNjZXNzIjp0cnVlfQ==",
//!     "data": { "temp": 21 }
//!   }
//! }
//! ```

use serde::Serialize;
use serde_json::{Map, Value, json};
use w402_http::headers::PaymentReceipts;
use w402_http::{ExecutionFailure, Outcome, UpstreamResponse};

/// Text returned when an envelope cannot be serialized.
const SERIALIZATION_FALLBACK: &str = r#"{"ok":false,"error":"serialization_failed","message":"failed to serialize result"}"#;

/// Where the data was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    /// Base URL of the resource server.
    pub url: String,
    /// Endpoint path on that server.
    pub path: String,
}

/// The tool invocation being answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    /// Tool name.
    pub tool: &'static str,
    /// Declared inputs, flattened next to the tool name.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl RequestEnvelope {
    /// Describes a call to `tool` with no inputs.
    #[must_use]
    pub fn new(tool: &'static str) -> Self {
        Self {
            tool,
            params: Map::new(),
        }
    }

    /// Adds an input; `None` values are left out.
    #[must_use]
    pub fn param(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.params.insert(name.to_owned(), Value::from(value));
        }
        self
    }
}

/// What the resource server answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Upstream {
    /// HTTP status, or `null` when no response arrived.
    pub status: Option<u16>,
    /// Value of the `PAYMENT-RESPONSE` header.
    pub payment_response_header: Option<String>,
    /// Value of the `X-PAYMENT-RESPONSE` header.
    pub x_payment_response_header: Option<String>,
    /// Response body, or `{ "message": … }` when there is none.
    pub data: Value,
}

/// The envelope of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    /// `true` when the upstream answered with anything but 402.
    pub ok: bool,
    /// Where the data came from.
    pub source: Source,
    /// The invocation being answered.
    pub request: RequestEnvelope,
    /// What the upstream answered.
    pub upstream: Upstream,
}

impl ResultEnvelope {
    /// Normalizes an execution outcome.
    #[must_use]
    pub fn from_outcome(source: Source, request: RequestEnvelope, outcome: Outcome) -> Self {
        let (ok, upstream) = match outcome {
            Outcome::Succeeded(response) => (true, succeeded(response)),
            Outcome::Failed(failure) => (false, failed(failure)),
        };
        Self {
            ok,
            source,
            request,
            upstream,
        }
    }
}

fn succeeded(response: UpstreamResponse) -> Upstream {
    let receipts = PaymentReceipts::from_headers(&response.headers);
    Upstream {
        status: Some(response.status.as_u16()),
        payment_response_header: receipts.payment_response,
        x_payment_response_header: receipts.x_payment_response,
        data: body_value(&response.body),
    }
}

fn failed(failure: ExecutionFailure) -> Upstream {
    let receipts = failure
        .headers
        .as_ref()
        .map(PaymentReceipts::from_headers)
        .unwrap_or_default();
    let data = match &failure.body {
        Some(body) => body_value(body),
        None => json!({ "message": failure.message }),
    };
    Upstream {
        status: failure.status.map(|s| s.as_u16()),
        payment_response_header: receipts.payment_response,
        x_payment_response_header: receipts.x_payment_response,
        data,
    }
}

/// Decodes a body as JSON, or passes it through as text.
fn body_value(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

/// Renders `value` as pretty JSON, never failing.
#[must_use]
pub fn render<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|err| {
        tracing::error!(error = %err, "Failed to serialize tool result");
        fallback_text(&err.to_string())
    })
}

fn fallback_text(message: &str) -> String {
    serde_json::to_string(&json!({
        "ok": false,
        "error": "serialization_failed",
        "message": message,
    }))
    .unwrap_or_else(|_| SERIALIZATION_FALLBACK.to_owned())
}
