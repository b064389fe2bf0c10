//! Error types for credentials, signing, and payment negotiation.

use crate::chain::NetworkFamily;

/// A signing credential could not be turned into a signer capability.
///
/// Raised at startup only; the process refuses to serve tools afterwards.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The secret for `family` is not a valid key.
    #[error("invalid {family} private key: {reason}")]
    Malformed {
        /// The family the secret was configured for.
        family: NetworkFamily,
        /// Why the secret was rejected. Never contains the secret itself.
        reason: String,
    },

    /// No secret was configured for any family.
    #[error("no signing credential configured, set EVM_PRIVATE_KEY or SVM_PRIVATE_KEY")]
    Missing,
}

impl CredentialError {
    /// Creates a [`CredentialError::Malformed`] for `family`.
    pub fn malformed(family: NetworkFamily, reason: impl Into<String>) -> Self {
        Self::Malformed {
            family,
            reason: reason.into(),
        }
    }
}

/// None of the offered payment options can be served by a registered signer.
#[derive(Debug, Clone, thiserror::Error)]
#[error("no registered signer supports the offered payment options [{}]", offered.join(", "))]
pub struct UnsupportedSchemeError {
    /// The offered options, as `scheme@network`.
    pub offered: Vec<String>,
}

/// A signer capability failed to produce a payload for a selected option.
#[derive(Debug, thiserror::Error)]
pub enum SchemeError {
    /// A field of the selected option cannot be used by this signer.
    #[error("invalid payment requirements: {0}")]
    InvalidRequirements(String),

    /// The cryptographic signing step failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Turning a challenge into a proof failed.
///
/// Every variant is recoverable: the caller surfaces the original 402
/// response instead of retrying.
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// No offered option matches a registered signer.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedSchemeError),

    /// Options matched, but the selector rejected all of them.
    #[error("no acceptable payment option among {candidates} candidate(s)")]
    NoAcceptableOption {
        /// How many options matched a registered signer.
        candidates: usize,
    },

    /// The selected signer failed.
    #[error(transparent)]
    Scheme(#[from] SchemeError),
}
