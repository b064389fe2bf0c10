//! Payment scheme plumbing.
//!
//! - [`SchemeSigner`] - A credential-backed capability that signs payment options
//! - [`PaymentOption`] - One offered option of a challenge, normalized across versions
//! - [`SchemeRegistry`] - One signer per [`NetworkFamily`]
//! - [`PaymentSelector`] - Chooses among matching options ([`FirstMatch`],
//!   [`PreferFamily`], [`MaxAmount`])

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use alloy_primitives::U256;
use serde_json::Value;

use crate::chain::{ChainId, NetworkFamily};
use crate::error::SchemeError;

mod registry;
mod selector;

pub use registry::SchemeRegistry;
pub use selector::{FirstMatch, MaxAmount, PaymentSelector, PreferFamily};

/// The only payment scheme this client can sign for.
pub const EXACT_SCHEME: &str = "exact";

/// A boxed, sendable future, used by object-safe async traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A signing capability for one network family.
///
/// Implementations hold key material derived once at startup and are
/// immutable afterwards, so a single instance can serve concurrent requests.
pub trait SchemeSigner: Send + Sync {
    /// Returns the family this signer serves.
    fn family(&self) -> NetworkFamily;

    /// Returns the public identity derived from the credential
    /// (an `0x` address or a base58 public key).
    fn address(&self) -> String;

    /// Produces the scheme-specific signed payload for `option`.
    ///
    /// The returned value becomes the `payload` field of the proof.
    fn sign_payment<'a>(
        &'a self,
        option: &'a PaymentOption,
    ) -> BoxFuture<'a, Result<Value, SchemeError>>;
}

impl fmt::Debug for dyn SchemeSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeSigner")
            .field("family", &self.family())
            .field("address", &self.address())
            .finish()
    }
}

/// One offered payment option, normalized across protocol versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOption {
    /// Position of this option in the challenge's `accepts` list.
    pub index: usize,
    /// Protocol version of the challenge (1 or 2).
    pub version: u8,
    /// Payment scheme (e.g., `exact`).
    pub scheme: String,
    /// Network as offered: a V1 name or a CAIP-2 id.
    pub network: String,
    /// The resolved chain, when the network is known or CAIP-2 formatted.
    pub chain_id: Option<ChainId>,
    /// Token asset address or mint.
    pub asset: String,
    /// Amount in atomic units, as offered.
    pub amount: String,
    /// Recipient address.
    pub pay_to: String,
    /// Validity window requested by the server.
    pub max_timeout_seconds: u64,
    /// Scheme-specific extra data, `None` when absent or null.
    pub extra: Option<Value>,
}

impl PaymentOption {
    /// Returns the network family of this option, if it can be resolved.
    #[must_use]
    pub fn family(&self) -> Option<NetworkFamily> {
        self.chain_id.as_ref().and_then(ChainId::family)
    }

    /// Returns `true` when this option uses the `exact` scheme.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.scheme == EXACT_SCHEME
    }

    /// Parses the amount as an unsigned decimal integer.
    #[must_use]
    pub fn amount_value(&self) -> Option<U256> {
        let amount = self.amount.trim();
        if amount.is_empty() || !amount.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        U256::from_str_radix(amount, 10).ok()
    }

    /// Returns a string field of `extra`, if present.
    #[must_use]
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.as_ref()?.get(key)?.as_str()
    }
}
