//! ERC-3009 `transferWithAuthorization` payloads for the `exact` scheme.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, Bytes, FixedBytes, U256};
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::{SolStruct, eip712_domain, sol};
use rand::RngExt;
use rand::rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use w402::error::SchemeError;
use w402::timestamp::UnixTimestamp;

/// A token amount in atomic units, serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAmount(pub U256);

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenAmount {
    type Err = alloy_primitives::ruint::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str_radix(s, 10).map(Self)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The authorization that was signed, in wire format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eip3009Authorization {
    /// The address authorizing the transfer (token owner).
    pub from: Address,
    /// The recipient address for the transfer.
    pub to: Address,
    /// The amount of tokens to transfer.
    pub value: TokenAmount,
    /// The authorization is not valid before this timestamp.
    pub valid_after: UnixTimestamp,
    /// The authorization expires at this timestamp.
    pub valid_before: UnixTimestamp,
    /// A unique 32-byte nonce to prevent replay.
    pub nonce: B256,
}

/// Signed payload of the EVM `exact` scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmPayload {
    /// 65-byte EOA signature over the EIP-712 hash.
    pub signature: Bytes,
    /// The structured authorization that was signed.
    pub authorization: Eip3009Authorization,
}

sol!(
    /// EIP-712 struct for ERC-3009 `transferWithAuthorization`.
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
);

impl From<&Eip3009Authorization> for TransferWithAuthorization {
    fn from(authorization: &Eip3009Authorization) -> Self {
        Self {
            from: authorization.from,
            to: authorization.to,
            value: authorization.value.0,
            validAfter: U256::from(authorization.valid_after.as_secs()),
            validBefore: U256::from(authorization.valid_before.as_secs()),
            nonce: authorization.nonce,
        }
    }
}

/// Parameters of one ERC-3009 signature.
#[derive(Debug, Clone)]
pub struct Eip3009SigningParams {
    /// The EIP-155 chain ID.
    pub chain_id: u64,
    /// The token contract address (verifying contract for EIP-712).
    pub asset_address: Address,
    /// The recipient address for the transfer.
    pub pay_to: Address,
    /// The amount to transfer.
    pub amount: U256,
    /// Length of the validity window, in seconds.
    pub max_timeout_seconds: u64,
    /// EIP-712 domain name of the token.
    pub name: String,
    /// EIP-712 domain version of the token.
    pub version: String,
}

impl Eip3009SigningParams {
    /// Returns the EIP-712 signing hash of `authorization` under these params.
    #[must_use]
    pub fn signing_hash(&self, authorization: &Eip3009Authorization) -> B256 {
        let domain = eip712_domain! {
            name: self.name.clone(),
            version: self.version.clone(),
            chain_id: self.chain_id,
            verifying_contract: self.asset_address,
        };
        TransferWithAuthorization::from(authorization).eip712_signing_hash(&domain)
    }
}

/// Signs an ERC-3009 `TransferWithAuthorization` using EIP-712.
///
/// The authorization is valid from ten minutes ago until
/// `max_timeout_seconds` from now, and carries a fresh random nonce.
///
/// # Errors
///
/// Returns [`SchemeError::Signing`] if EIP-712 signing fails.
pub async fn sign_erc3009_authorization(
    signer: &PrivateKeySigner,
    params: &Eip3009SigningParams,
) -> Result<ExactEvmPayload, SchemeError> {
    let (valid_after, valid_before) = UnixTimestamp::validity_window(params.max_timeout_seconds);
    let nonce: [u8; 32] = rng().random();

    let authorization = Eip3009Authorization {
        from: signer.address(),
        to: params.pay_to,
        value: TokenAmount(params.amount),
        valid_after,
        valid_before,
        nonce: FixedBytes(nonce),
    };

    let hash = params.signing_hash(&authorization);
    let signature = alloy_signer::Signer::sign_hash(signer, &hash)
        .await
        .map_err(|e| SchemeError::Signing(e.to_string()))?;

    Ok(ExactEvmPayload {
        signature: signature.as_bytes().into(),
        authorization,
    })
}
