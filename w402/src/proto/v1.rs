//! Version 1 messages.
//!
//! A V1 server puts the challenge in the 402 body and names networks by
//! their legacy names (`base-sepolia`, `solana-devnet`). The client answers
//! with an `X-PAYMENT` header.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `x402Version: 1`.
pub type X402Version1 = super::Version<1>;

/// The V1 version tag.
pub const V1: X402Version1 = super::Version;

/// One entry of a V1 `accepts` list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Scheme name, `exact` for every option this client pays.
    pub scheme: String,
    /// Legacy network name.
    pub network: String,
    /// Price in atomic units of `asset`.
    pub max_amount_required: String,
    /// Token contract (EVM) or mint (Solana).
    pub asset: String,
    /// Who gets paid.
    pub pay_to: String,
    /// How long a signed payment stays valid.
    pub max_timeout_seconds: u64,
    /// URL the price applies to.
    #[serde(default)]
    pub resource: String,
    /// Free text shown to payers.
    #[serde(default)]
    pub description: String,
    /// Content type of the paid response.
    #[serde(default)]
    pub mime_type: String,
    /// Shape of the paid response, when published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Scheme parameters, such as the EIP-712 domain of the token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Body of a V1 402 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Always `1`.
    pub x402_version: X402Version1,
    /// Why the request was refused, when the server says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Options the server accepts, in its order of preference.
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
}

/// Decoded content of the `X-PAYMENT` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// Always `1`.
    pub x402_version: X402Version1,
    /// Copied from the chosen option.
    pub scheme: String,
    /// Copied from the chosen option.
    pub network: String,
    /// Signer output for the chosen option.
    pub payload: Value,
}
