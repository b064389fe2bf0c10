//! Transfer authorizations for the Solana `exact` scheme.
//!
//! The payer signs the canonical JSON encoding of an
//! [`ExactSvmAuthorization`] with its ed25519 key. Field order is fixed by
//! the struct definition, so the signed bytes are reproducible from the
//! authorization alone.
//!
//! The x402 `exact` Solana payload is a partially signed transaction instead;
//! standard facilitators do not accept this format.

use rand::RngExt;
use rand::rng;
use serde::{Deserialize, Serialize};
use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use w402::error::SchemeError;
use w402::timestamp::UnixTimestamp;

/// The authorization that is signed, in wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactSvmAuthorization {
    /// Payer public key (base58).
    pub from: String,
    /// Recipient public key (base58).
    pub to: String,
    /// SPL token mint (base58).
    pub asset: String,
    /// Amount in atomic units.
    pub amount: String,
    /// Network as offered in the challenge.
    pub network: String,
    /// The authorization is not valid before this timestamp.
    pub valid_after: UnixTimestamp,
    /// The authorization expires at this timestamp.
    pub valid_before: UnixTimestamp,
    /// Random 32-byte nonce (base58).
    pub nonce: String,
}

impl ExactSvmAuthorization {
    /// Returns the bytes covered by the signature.
    ///
    /// # Errors
    ///
    /// Returns [`SchemeError::Json`] if the authorization cannot be encoded.
    pub fn message(&self) -> Result<Vec<u8>, SchemeError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Signed payload of the Solana `exact` scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactSvmPayload {
    /// ed25519 signature over [`ExactSvmAuthorization::message`] (base58).
    pub signature: String,
    /// The authorization that was signed.
    pub authorization: ExactSvmAuthorization,
}

/// Parameters of one Solana authorization.
#[derive(Debug, Clone)]
pub struct SvmSigningParams {
    /// Recipient.
    pub pay_to: Pubkey,
    /// SPL token mint.
    pub asset: Pubkey,
    /// Amount in atomic units.
    pub amount: u64,
    /// Network as offered.
    pub network: String,
    /// Length of the validity window, in seconds.
    pub max_timeout_seconds: u64,
}

/// Builds a fresh authorization for `params`, payable by `keypair`.
#[must_use]
pub fn build_authorization(keypair: &Keypair, params: &SvmSigningParams) -> ExactSvmAuthorization {
    let (valid_after, valid_before) = UnixTimestamp::validity_window(params.max_timeout_seconds);
    let nonce: [u8; 32] = rng().random();
    ExactSvmAuthorization {
        from: keypair.pubkey().to_string(),
        to: params.pay_to.to_string(),
        asset: params.asset.to_string(),
        amount: params.amount.to_string(),
        network: params.network.clone(),
        valid_after,
        valid_before,
        nonce: bs58::encode(nonce).into_string(),
    }
}

/// Signs `authorization` with `keypair`.
///
/// # Errors
///
/// Returns [`SchemeError::Signing`] if the keypair is not the payer of the
/// authorization, or [`SchemeError::Json`] if it cannot be encoded.
pub fn sign_authorization(
    keypair: &Keypair,
    authorization: ExactSvmAuthorization,
) -> Result<ExactSvmPayload, SchemeError> {
    if authorization.from != keypair.pubkey().to_string() {
        return Err(SchemeError::Signing(format!(
            "keypair {} cannot sign for {}",
            keypair.pubkey(),
            authorization.from
        )));
    }
    let message = authorization.message()?;
    let signature = keypair.sign_message(&message);
    Ok(ExactSvmPayload {
        signature: signature.to_string(),
        authorization,
    })
}
