use std::fmt;
use std::str::FromStr;

use solana_keypair::Keypair;
use solana_pubkey::Pubkey;
use solana_signer::Signer;
use w402::chain::NetworkFamily;
use w402::error::{CredentialError, SchemeError};
use w402::scheme::{BoxFuture, PaymentOption, SchemeSigner};

use crate::exact::{SvmSigningParams, build_authorization, sign_authorization};

/// Length of a base58-decoded Solana keypair: secret half then public half.
const KEYPAIR_LEN: usize = 64;

/// Signer capability for Solana, backed by a local ed25519 keypair.
pub struct SvmSigner {
    keypair: Keypair,
}

impl fmt::Debug for SvmSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvmSigner")
            .field("pubkey", &self.keypair.pubkey())
            .finish_non_exhaustive()
    }
}

impl SvmSigner {
    /// Builds a signer from a base58-encoded 64-byte keypair.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Malformed`] if the secret is not base58,
    /// is not 64 bytes long, or its public half does not match its secret half.
    pub fn from_secret(secret: &str) -> Result<Self, CredentialError> {
        let malformed = |reason: String| CredentialError::malformed(NetworkFamily::Svm, reason);

        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|e| malformed(format!("invalid base58: {e}")))?;
        if bytes.len() != KEYPAIR_LEN {
            return Err(malformed(format!(
                "expected {KEYPAIR_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let (secret_half, public_half) = bytes.split_at(32);
        let mut secret_bytes = [0u8; 32];
        secret_bytes.copy_from_slice(secret_half);

        let keypair = Keypair::new_from_array(secret_bytes);
        if keypair.pubkey().as_ref() != public_half {
            return Err(malformed(
                "public key does not match the secret key".to_owned(),
            ));
        }
        Ok(Self { keypair })
    }

    /// Like [`SvmSigner::from_secret`], treating an absent or blank secret as
    /// "not configured".
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Malformed`] if a non-blank secret is invalid.
    pub fn from_optional_secret(secret: Option<&str>) -> Result<Option<Self>, CredentialError> {
        match secret.map(str::trim) {
            None | Some("") => Ok(None),
            Some(secret) => Self::from_secret(secret).map(Some),
        }
    }

    /// Returns the public key derived from the keypair.
    #[must_use]
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    fn signing_params(option: &PaymentOption) -> Result<SvmSigningParams, SchemeError> {
        let is_solana = option
            .chain_id
            .as_ref()
            .is_some_and(|c| c.namespace() == NetworkFamily::Svm.namespace());
        if !is_solana {
            return Err(SchemeError::InvalidRequirements(format!(
                "network {} is not a Solana chain",
                option.network
            )));
        }
        let amount = option.amount.trim().parse::<u64>().map_err(|e| {
            SchemeError::InvalidRequirements(format!("invalid amount {}: {e}", option.amount))
        })?;
        Ok(SvmSigningParams {
            pay_to: parse_pubkey("payTo", &option.pay_to)?,
            asset: parse_pubkey("asset", &option.asset)?,
            amount,
            network: option.network.clone(),
            max_timeout_seconds: option.max_timeout_seconds,
        })
    }
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, SchemeError> {
    Pubkey::from_str(value.trim())
        .map_err(|e| SchemeError::InvalidRequirements(format!("invalid {field} {value}: {e}")))
}

impl SchemeSigner for SvmSigner {
    fn family(&self) -> NetworkFamily {
        NetworkFamily::Svm
    }

    fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    fn sign_payment<'a>(
        &'a self,
        option: &'a PaymentOption,
    ) -> BoxFuture<'a, Result<serde_json::Value, SchemeError>> {
        Box::pin(async move {
            let params = Self::signing_params(option)?;
            #[cfg(feature = "telemetry")]
            tracing::debug!(
                network = %params.network,
                asset = %params.asset,
                amount = params.amount,
                "Signing Solana authorization"
            );
            let authorization = build_authorization(&self.keypair, &params);
            let payload = sign_authorization(&self.keypair, authorization)?;
            Ok(serde_json::to_value(payload)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::ExactSvmPayload;
    use w402::chain::ChainId;

    fn keypair_secret(seed: u8) -> String {
        let keypair = Keypair::new_from_array([seed; 32]);
        let mut bytes = [seed; 32].to_vec();
        bytes.extend_from_slice(keypair.pubkey().as_ref());
        bs58::encode(bytes).into_string()
    }

    fn devnet_option() -> PaymentOption {
        PaymentOption {
            index: 0,
            version: 2,
            scheme: "exact".into(),
            network: "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1".into(),
            chain_id: ChainId::resolve("solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1"),
            asset: "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU".into(),
            amount: "2500".into(),
            pay_to: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".into(),
            max_timeout_seconds: 60,
            extra: None,
        }
    }

    #[test]
    fn test_from_secret_derives_pubkey() {
        let signer = SvmSigner::from_secret(&keypair_secret(7)).unwrap();
        assert_eq!(signer.pubkey(), Keypair::new_from_array([7u8; 32]).pubkey());
        assert_eq!(signer.family(), NetworkFamily::Svm);
    }

    #[test]
    fn test_rejects_bad_base58_and_length() {
        assert!(matches!(
            SvmSigner::from_secret("0OIl"),
            Err(CredentialError::Malformed { family: NetworkFamily::Svm, .. })
        ));
        let short = bs58::encode([1u8; 32]).into_string();
        let err = SvmSigner::from_secret(&short).unwrap_err();
        assert!(err.to_string().contains("expected 64 bytes, got 32"));
    }

    #[test]
    fn test_rejects_mismatched_public_half() {
        let mut bytes = [7u8; 32].to_vec();
        bytes.extend_from_slice(Keypair::new_from_array([8u8; 32]).pubkey().as_ref());
        let err = SvmSigner::from_secret(&bs58::encode(bytes).into_string()).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_optional_secret() {
        assert!(SvmSigner::from_optional_secret(None).unwrap().is_none());
        assert!(SvmSigner::from_optional_secret(Some("")).unwrap().is_none());
        assert!(
            SvmSigner::from_optional_secret(Some(&keypair_secret(1)))
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_sign_payment_produces_verifiable_payload() {
        let signer = SvmSigner::from_secret(&keypair_secret(7)).unwrap();
        let value = signer.sign_payment(&devnet_option()).await.unwrap();
        let payload: ExactSvmPayload = serde_json::from_value(value).unwrap();

        assert_eq!(payload.authorization.from, signer.address());
        assert_eq!(payload.authorization.amount, "2500");
        let signature: solana_signature::Signature = payload.signature.parse().unwrap();
        assert!(signature.verify(
            signer.pubkey().as_ref(),
            &payload.authorization.message().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_option_fields() {
        let signer = SvmSigner::from_secret(&keypair_secret(7)).unwrap();

        let mut evm = devnet_option();
        evm.chain_id = ChainId::resolve("base");
        assert!(matches!(
            signer.sign_payment(&evm).await,
            Err(SchemeError::InvalidRequirements(_))
        ));

        let mut bad_amount = devnet_option();
        bad_amount.amount = "1e6".into();
        assert!(signer.sign_payment(&bad_amount).await.is_err());

        let mut bad_mint = devnet_option();
        bad_mint.asset = "0x036CbD53842c5426634e7929541eC2318f3dCF7e".into();
        assert!(signer.sign_payment(&bad_mint).await.is_err());
    }
}
