use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use alloy_signer_local::PrivateKeySigner;
use w402::chain::NetworkFamily;
use w402::error::{CredentialError, SchemeError};
use w402::scheme::{BoxFuture, PaymentOption, SchemeSigner};

use crate::exact::{Eip3009SigningParams, sign_erc3009_authorization};
use crate::networks::token_deployment;

/// Signer capability for EVM chains, backed by a local private key.
pub struct EvmSigner {
    inner: PrivateKeySigner,
}

impl fmt::Debug for EvmSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmSigner")
            .field("address", &self.inner.address())
            .finish_non_exhaustive()
    }
}

impl EvmSigner {
    /// Builds a signer from a hex private key, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Malformed`] if the key is not a valid
    /// secp256k1 secret.
    pub fn from_secret(secret: &str) -> Result<Self, CredentialError> {
        let inner = PrivateKeySigner::from_str(secret.trim())
            .map_err(|e| CredentialError::malformed(NetworkFamily::Evm, e.to_string()))?;
        Ok(Self { inner })
    }

    /// Like [`EvmSigner::from_secret`], treating an absent or blank secret as
    /// "not configured".
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Malformed`] if a non-blank key is invalid.
    pub fn from_optional_secret(secret: Option<&str>) -> Result<Option<Self>, CredentialError> {
        match secret.map(str::trim) {
            None | Some("") => Ok(None),
            Some(secret) => Self::from_secret(secret).map(Some),
        }
    }

    /// Returns the address derived from the key.
    #[must_use]
    pub fn evm_address(&self) -> Address {
        self.inner.address()
    }

    fn signing_params(option: &PaymentOption) -> Result<Eip3009SigningParams, SchemeError> {
        let chain_id = option
            .chain_id
            .as_ref()
            .filter(|c| c.namespace() == NetworkFamily::Evm.namespace())
            .and_then(|c| c.reference().parse::<u64>().ok())
            .ok_or_else(|| {
                SchemeError::InvalidRequirements(format!(
                    "network {} is not an EIP-155 chain",
                    option.network
                ))
            })?;
        let asset_address = parse_address("asset", &option.asset)?;
        let pay_to = parse_address("payTo", &option.pay_to)?;
        let amount: U256 = option.amount_value().ok_or_else(|| {
            SchemeError::InvalidRequirements(format!("invalid amount {}", option.amount))
        })?;

        let known = token_deployment(chain_id, asset_address);
        let name = option
            .extra_str("name")
            .or_else(|| known.map(|d| d.name))
            .ok_or_else(|| missing_domain("name", option))?;
        let version = option
            .extra_str("version")
            .or_else(|| known.map(|d| d.version))
            .ok_or_else(|| missing_domain("version", option))?;

        Ok(Eip3009SigningParams {
            chain_id,
            asset_address,
            pay_to,
            amount,
            max_timeout_seconds: option.max_timeout_seconds,
            name: name.to_owned(),
            version: version.to_owned(),
        })
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, SchemeError> {
    Address::from_str(value.trim())
        .map_err(|e| SchemeError::InvalidRequirements(format!("invalid {field} {value}: {e}")))
}

fn missing_domain(field: &str, option: &PaymentOption) -> SchemeError {
    SchemeError::InvalidRequirements(format!(
        "no EIP-712 domain {field} for asset {} on {}",
        option.asset, option.network
    ))
}

impl SchemeSigner for EvmSigner {
    fn family(&self) -> NetworkFamily {
        NetworkFamily::Evm
    }

    fn address(&self) -> String {
        self.inner.address().to_checksum(None)
    }

    fn sign_payment<'a>(
        &'a self,
        option: &'a PaymentOption,
    ) -> BoxFuture<'a, Result<serde_json::Value, SchemeError>> {
        Box::pin(async move {
            let params = Self::signing_params(option)?;
            #[cfg(feature = "telemetry")]
            tracing::debug!(
                chain_id = params.chain_id,
                asset = %params.asset_address,
                amount = %params.amount,
                "Signing ERC-3009 authorization"
            );
            let payload = sign_erc3009_authorization(&self.inner, &params).await?;
            Ok(serde_json::to_value(payload)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::ExactEvmPayload;
    use alloy_primitives::{Signature, address};
    use serde_json::json;
    use w402::chain::ChainId;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const ANVIL_ADDRESS: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    fn base_sepolia_option(extra: Option<serde_json::Value>) -> PaymentOption {
        PaymentOption {
            index: 0,
            version: 1,
            scheme: "exact".into(),
            network: "base-sepolia".into(),
            chain_id: ChainId::resolve("base-sepolia"),
            asset: "0x036CbD53842c5426634e7929541eC2318f3dCF7e".into(),
            amount: "10000".into(),
            pay_to: "0x209693Bc6afc0C5328bA36FaF03C514EF312287C".into(),
            max_timeout_seconds: 300,
            extra,
        }
    }

    #[test]
    fn test_from_secret_with_and_without_prefix() {
        let with = EvmSigner::from_secret(ANVIL_KEY).unwrap();
        let without = EvmSigner::from_secret(ANVIL_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(with.evm_address(), ANVIL_ADDRESS);
        assert_eq!(without.evm_address(), ANVIL_ADDRESS);
        assert_eq!(with.address(), "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    }

    #[test]
    fn test_malformed_secret_is_rejected_without_echo() {
        let err = EvmSigner::from_secret("0xnot-a-key").unwrap_err();
        let CredentialError::Malformed { family, reason } = err else {
            panic!("expected malformed");
        };
        assert_eq!(family, NetworkFamily::Evm);
        assert!(!reason.contains("not-a-key"));
    }

    #[test]
    fn test_optional_secret() {
        assert!(EvmSigner::from_optional_secret(None).unwrap().is_none());
        assert!(EvmSigner::from_optional_secret(Some("  ")).unwrap().is_none());
        assert!(EvmSigner::from_optional_secret(Some(ANVIL_KEY)).unwrap().is_some());
        assert!(EvmSigner::from_optional_secret(Some("12")).is_err());
    }

    #[tokio::test]
    async fn test_signature_recovers_to_signer() {
        let signer = EvmSigner::from_secret(ANVIL_KEY).unwrap();
        let option = base_sepolia_option(Some(json!({ "name": "USDC", "version": "2" })));

        let value = signer.sign_payment(&option).await.unwrap();
        let payload: ExactEvmPayload = serde_json::from_value(value).unwrap();
        let authorization = payload.authorization;
        assert_eq!(authorization.from, ANVIL_ADDRESS);
        assert_eq!(
            authorization.to,
            address!("209693Bc6afc0C5328bA36FaF03C514EF312287C")
        );
        assert_eq!(authorization.value.to_string(), "10000");
        assert_eq!(
            authorization.valid_before.as_secs() - authorization.valid_after.as_secs(),
            300 + w402::timestamp::UnixTimestamp::VALID_AFTER_SKEW_SECS
        );

        let params = EvmSigner::signing_params(&option).unwrap();
        let hash = params.signing_hash(&authorization);
        let signature = Signature::from_raw(&payload.signature).unwrap();
        assert_eq!(
            signature.recover_address_from_prehash(&hash).unwrap(),
            ANVIL_ADDRESS
        );
    }

    #[tokio::test]
    async fn test_nonces_are_fresh() {
        let signer = EvmSigner::from_secret(ANVIL_KEY).unwrap();
        let option = base_sepolia_option(None);
        let a: ExactEvmPayload =
            serde_json::from_value(signer.sign_payment(&option).await.unwrap()).unwrap();
        let b: ExactEvmPayload =
            serde_json::from_value(signer.sign_payment(&option).await.unwrap()).unwrap();
        assert_ne!(a.authorization.nonce, b.authorization.nonce);
    }

    #[test]
    fn test_domain_falls_back_to_known_deployment() {
        let params = EvmSigner::signing_params(&base_sepolia_option(None)).unwrap();
        assert_eq!(params.chain_id, 84532);
        assert_eq!(params.name, "USDC");
        assert_eq!(params.version, "2");
    }

    #[test]
    fn test_unknown_asset_without_domain_is_invalid() {
        let mut option = base_sepolia_option(None);
        option.asset = "0x0000000000000000000000000000000000000001".into();
        assert!(matches!(
            EvmSigner::signing_params(&option),
            Err(SchemeError::InvalidRequirements(_))
        ));
    }

    #[test]
    fn test_rejects_non_evm_network_and_bad_fields() {
        let mut option = base_sepolia_option(None);
        option.chain_id = ChainId::resolve("solana");
        assert!(EvmSigner::signing_params(&option).is_err());

        let mut option = base_sepolia_option(None);
        option.pay_to = "nobody".into();
        assert!(EvmSigner::signing_params(&option).is_err());

        let mut option = base_sepolia_option(None);
        option.amount = "-1".into();
        assert!(EvmSigner::signing_params(&option).is_err());
    }
}
