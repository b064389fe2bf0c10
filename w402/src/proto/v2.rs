//! Version 2 messages.
//!
//! A V2 server sends the challenge as base64 JSON in `PAYMENT-REQUIRED`
//! (some also repeat it in the body) and names networks with CAIP-2 ids such
//! as `eip155:84532`. The client answers with `PAYMENT-SIGNATURE`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `x402Version: 2`.
pub type X402Version2 = super::Version<2>;

/// The V2 version tag.
pub const V2: X402Version2 = super::Version;

/// The paid resource, as the server describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// Resource URL.
    pub url: String,
    /// Free text shown to payers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content type of the paid response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One entry of a V2 `accepts` list.
///
/// Echoed back verbatim as `accepted` in the payment payload: `extra` keeps
/// the exact shape the server sent and unknown fields are carried along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Scheme name.
    pub scheme: String,
    /// CAIP-2 chain id.
    pub network: String,
    /// Token contract or mint.
    pub asset: String,
    /// Price in atomic units of `asset`.
    pub amount: String,
    /// Who gets paid.
    pub pay_to: String,
    /// How long a signed payment stays valid.
    pub max_timeout_seconds: u64,
    /// Scheme parameters. `None` when absent, `Some(Null)` when sent as `null`.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub extra: Option<Value>,
    /// Fields this client does not interpret.
    #[serde(flatten)]
    pub unknown: Map<String, Value>,
}

impl PaymentRequirements {
    /// Returns `extra` unless it is absent or `null`.
    #[must_use]
    pub fn extra(&self) -> Option<&Value> {
        self.extra.as_ref().filter(|v| !v.is_null())
    }
}

/// Keeps an explicit `null` apart from a missing field.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// A V2 challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Always `2`.
    pub x402_version: X402Version2,
    /// Why the request was refused, when the server says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The resource the challenge is for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceInfo>,
    /// Options the server accepts, in its order of preference.
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
    /// Protocol extensions, passed back untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// Decoded content of the `PAYMENT-SIGNATURE` header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Always `2`.
    pub x402_version: X402Version2,
    /// The option being paid, exactly as offered.
    pub accepted: PaymentRequirements,
    /// Copied from the challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceInfo>,
    /// Signer output for `accepted`.
    pub payload: Value,
    /// Copied from the challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}
