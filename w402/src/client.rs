//! Payment negotiation: from a 402 challenge to a signed proof.
//!
//! [`PaymentNegotiator`] matches the offered options against the signers in a
//! [`SchemeRegistry`], lets a [`PaymentSelector`] pick one, asks the matching
//! signer for a payload exactly once, and wraps it into a [`PaymentProof`]
//! ready to be attached to the retried request. It never touches the network.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "telemetry")]
use tracing::{debug, instrument};

use crate::chain::NetworkFamily;
use crate::encoding::Base64Bytes;
use crate::error::{NegotiationError, SchemeError, UnsupportedSchemeError};
use crate::proto::{PaymentRequired, v1, v2};
use crate::scheme::{FirstMatch, PaymentOption, PaymentSelector, SchemeRegistry};

/// A signed payment, ready to travel in a request header.
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentProof {
    /// Header name: `X-PAYMENT` for V1 challenges, `PAYMENT-SIGNATURE` for V2.
    pub header: &'static str,
    /// Base64-encoded JSON payment payload.
    pub value: String,
    /// Family of the signer that produced the proof.
    pub family: NetworkFamily,
    /// Network of the selected option, as offered.
    pub network: String,
    /// Amount of the selected option, in atomic units.
    pub amount: String,
    /// Public identity of the payer.
    pub payer: String,
}

impl fmt::Debug for PaymentProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentProof")
            .field("header", &self.header)
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .field("family", &self.family)
            .field("network", &self.network)
            .field("amount", &self.amount)
            .field("payer", &self.payer)
            .finish()
    }
}

/// Turns challenges into proofs using the registered signers.
pub struct PaymentNegotiator {
    registry: Arc<SchemeRegistry>,
    selector: Box<dyn PaymentSelector>,
}

impl fmt::Debug for PaymentNegotiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentNegotiator")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl PaymentNegotiator {
    /// Creates a negotiator that picks the first matching option.
    #[must_use]
    pub fn new(registry: Arc<SchemeRegistry>) -> Self {
        Self {
            registry,
            selector: Box::new(FirstMatch),
        }
    }

    /// Replaces the option selector.
    #[must_use]
    pub fn with_selector<P: PaymentSelector + 'static>(mut self, selector: P) -> Self {
        self.selector = Box::new(selector);
        self
    }

    /// Returns the options of `challenge` that a registered signer can serve,
    /// in challenge order.
    #[must_use]
    pub fn candidates(&self, challenge: &PaymentRequired) -> Vec<PaymentOption> {
        challenge
            .options()
            .into_iter()
            .filter(|o| o.is_exact() && o.family().is_some_and(|f| self.registry.contains(f)))
            .collect()
    }

    /// Produces a proof for one option of `challenge`.
    ///
    /// # Errors
    ///
    /// - [`NegotiationError::Unsupported`] if no option matches a registered signer
    /// - [`NegotiationError::NoAcceptableOption`] if the selector rejects every candidate
    /// - [`NegotiationError::Scheme`] if the selected signer fails
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "w402.negotiate", skip_all, fields(version = challenge.version()), err)
    )]
    pub async fn negotiate(
        &self,
        challenge: &PaymentRequired,
    ) -> Result<PaymentProof, NegotiationError> {
        let candidates = self.candidates(challenge);
        if candidates.is_empty() {
            return Err(UnsupportedSchemeError {
                offered: challenge.offered(),
            }
            .into());
        }

        let refs: Vec<&PaymentOption> = candidates.iter().collect();
        let selected = self
            .selector
            .select(&refs)
            .ok_or(NegotiationError::NoAcceptableOption {
                candidates: candidates.len(),
            })?;
        let family = selected
            .family()
            .ok_or_else(|| UnsupportedSchemeError {
                offered: challenge.offered(),
            })?;
        let signer = self.registry.resolve(family)?;

        #[cfg(feature = "telemetry")]
        debug!(
            %family,
            network = %selected.network,
            amount = %selected.amount,
            "Selected payment option"
        );

        let payload = signer.sign_payment(selected).await?;
        let value = encode_proof(challenge, selected, payload)?;

        Ok(PaymentProof {
            header: challenge.proof_header(),
            value,
            family,
            network: selected.network.clone(),
            amount: selected.amount.clone(),
            payer: signer.address(),
        })
    }
}

/// Wraps a signer payload into the versioned payment payload and encodes it.
fn encode_proof(
    challenge: &PaymentRequired,
    option: &PaymentOption,
    payload: serde_json::Value,
) -> Result<String, SchemeError> {
    let encoded = match challenge {
        PaymentRequired::V1(_) => Base64Bytes::encode_json(&v1::PaymentPayload {
            x402_version: v1::V1,
            scheme: option.scheme.clone(),
            network: option.network.clone(),
            payload,
        })?,
        PaymentRequired::V2(required) => {
            let accepted = required.accepts.get(option.index).cloned().ok_or_else(|| {
                SchemeError::InvalidRequirements(format!(
                    "option {} is not part of the challenge",
                    option.index
                ))
            })?;
            Base64Bytes::encode_json(&v2::PaymentPayload {
                x402_version: v2::V2,
                accepted,
                resource: required.resource.clone(),
                payload,
                extensions: required.extensions.clone(),
            })?
        }
    };
    Ok(encoded.to_string())
}
