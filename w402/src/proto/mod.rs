//! Wire format of x402 challenges and payment payloads.
//!
//! Both protocol versions are supported:
//!
//! - **V1** ([`v1`]): network names, challenge in the body, proof in `X-PAYMENT`
//! - **V2** ([`v2`]): CAIP-2 chain IDs, challenge in the `PAYMENT-REQUIRED`
//!   header, proof in `PAYMENT-SIGNATURE`
//!
//! [`PaymentRequired`] wraps either version and detects which one it is from
//! the `x402Version` field.

use serde_json::Value;

use crate::chain::ChainId;
use crate::encoding::Base64Bytes;
use crate::scheme::PaymentOption;

mod error;
pub mod v1;
pub mod v2;
mod version;

pub use error::ProtocolError;
pub use version::Version;

/// Header carrying a V1 payment proof (client to server).
pub const X_PAYMENT_HEADER: &str = "X-PAYMENT";

/// Header carrying a V2 payment proof (client to server).
pub const PAYMENT_SIGNATURE_HEADER: &str = "PAYMENT-SIGNATURE";

/// Header carrying a V2 challenge (server to client).
pub const PAYMENT_REQUIRED_HEADER: &str = "PAYMENT-REQUIRED";

/// A parsed 402 challenge, in either protocol version.
#[derive(Debug, Clone)]
pub enum PaymentRequired {
    /// Protocol version 1 challenge.
    V1(v1::PaymentRequired),
    /// Protocol version 2 challenge.
    V2(v2::PaymentRequired),
}

/// Extracts the `x402Version` from a JSON challenge.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingVersion`] when the field is absent and
/// [`ProtocolError::InvalidVersion`] when it is anything but 1 or 2.
pub fn detect_version(data: &Value) -> Result<u8, ProtocolError> {
    let version = data
        .get("x402Version")
        .ok_or(ProtocolError::MissingVersion)?;
    match version.as_u64() {
        Some(1) => Ok(1),
        Some(2) => Ok(2),
        _ => Err(ProtocolError::InvalidVersion(version.to_string())),
    }
}

impl PaymentRequired {
    /// Parses a challenge from a JSON value, auto-detecting its version.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] if the version is missing or unsupported, or
    /// if the value does not match the wire format of that version.
    pub fn from_json(data: Value) -> Result<Self, ProtocolError> {
        match detect_version(&data)? {
            1 => Ok(Self::V1(serde_json::from_value(data)?)),
            _ => Ok(Self::V2(serde_json::from_value(data)?)),
        }
    }

    /// Parses a challenge from raw JSON bytes, such as a 402 response body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] on parse failure.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let data: Value = serde_json::from_slice(bytes)?;
        Self::from_json(data)
    }

    /// Parses a challenge from a base64-encoded `PAYMENT-REQUIRED` header value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] on base64 or JSON failure.
    pub fn from_header(value: &[u8]) -> Result<Self, ProtocolError> {
        let bytes = Base64Bytes::from(value).decode()?;
        Self::from_slice(&bytes)
    }

    /// Returns the protocol version of this challenge.
    #[must_use]
    pub const fn version(&self) -> u8 {
        match self {
            Self::V1(_) => v1::X402Version1::VALUE,
            Self::V2(_) => v2::X402Version2::VALUE,
        }
    }

    /// Returns the server-supplied error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::V1(p) => p.error.as_deref(),
            Self::V2(p) => p.error.as_deref(),
        }
    }

    /// Returns the name of the header a proof for this challenge travels in.
    #[must_use]
    pub const fn proof_header(&self) -> &'static str {
        match self {
            Self::V1(_) => X_PAYMENT_HEADER,
            Self::V2(_) => PAYMENT_SIGNATURE_HEADER,
        }
    }

    /// Normalizes every offered option, in challenge order.
    #[must_use]
    pub fn options(&self) -> Vec<PaymentOption> {
        match self {
            Self::V1(p) => p
                .accepts
                .iter()
                .enumerate()
                .map(|(index, r)| PaymentOption {
                    index,
                    version: v1::X402Version1::VALUE,
                    scheme: r.scheme.clone(),
                    network: r.network.clone(),
                    chain_id: ChainId::resolve(&r.network),
                    asset: r.asset.clone(),
                    amount: r.max_amount_required.clone(),
                    pay_to: r.pay_to.clone(),
                    max_timeout_seconds: r.max_timeout_seconds,
                    extra: r.extra.clone().filter(|v| !v.is_null()),
                })
                .collect(),
            Self::V2(p) => p
                .accepts
                .iter()
                .enumerate()
                .map(|(index, r)| PaymentOption {
                    index,
                    version: v2::X402Version2::VALUE,
                    scheme: r.scheme.clone(),
                    network: r.network.clone(),
                    chain_id: ChainId::resolve(&r.network),
                    asset: r.asset.clone(),
                    amount: r.amount.clone(),
                    pay_to: r.pay_to.clone(),
                    max_timeout_seconds: r.max_timeout_seconds,
                    extra: r.extra().cloned(),
                })
                .collect(),
        }
    }

    /// Lists the offered options as `scheme@network` strings.
    #[must_use]
    pub fn offered(&self) -> Vec<String> {
        self.options()
            .iter()
            .map(|o| format!("{}@{}", o.scheme, o.network))
            .collect()
    }
}
