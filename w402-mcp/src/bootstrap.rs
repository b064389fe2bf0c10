//! Turns configuration into a ready tool server.
//!
//! Every failure here happens before the MCP transport starts.

use std::sync::Arc;

use tracing::info;
use w402::scheme::{MaxAmount, PreferFamily};
use w402::{CredentialError, PaymentNegotiator, SchemeRegistry};
use w402_evm::EvmSigner;
use w402_http::PaymentExecutor;
use w402_svm::SvmSigner;

use crate::config::Config;
use crate::envelope::Source;
use crate::error::StartupError;
use crate::tools::WeatherTools;

/// Registers a signer for every configured secret.
///
/// # Errors
///
/// Returns [`CredentialError::Malformed`] for an invalid secret and
/// [`CredentialError::Missing`] when no secret is configured.
pub fn build_registry(config: &Config) -> Result<Arc<SchemeRegistry>, CredentialError> {
    let mut registry = SchemeRegistry::new();
    if let Some(signer) = EvmSigner::from_optional_secret(config.evm_private_key.as_deref())? {
        info!(address = %signer.evm_address(), "EVM signer registered");
        registry.register(signer);
    }
    if let Some(signer) = SvmSigner::from_optional_secret(config.svm_private_key.as_deref())? {
        info!(pubkey = %signer.pubkey(), "SVM signer registered");
        registry.register(signer);
    }
    registry.into_shared()
}

/// Builds the negotiator, applying the amount cap and network preference.
#[must_use]
pub fn build_negotiator(registry: Arc<SchemeRegistry>, config: &Config) -> PaymentNegotiator {
    let negotiator = PaymentNegotiator::new(registry);
    match (config.max_payment_amount, config.preferred_network) {
        (Some(cap), Some(family)) => negotiator.with_selector(MaxAmount {
            cap,
            inner: PreferFamily(family),
        }),
        (Some(cap), None) => negotiator.with_selector(MaxAmount::new(cap)),
        (None, Some(family)) => negotiator.with_selector(PreferFamily(family)),
        (None, None) => negotiator,
    }
}

/// Builds the tool server described by `config`.
///
/// # Errors
///
/// Returns a [`StartupError`] for missing or malformed credentials, an
/// invalid endpoint URL, or an HTTP client that cannot be built.
pub fn bootstrap(config: &Config) -> Result<WeatherTools, StartupError> {
    let registry = build_registry(config)?;
    let endpoint = config.endpoint_url()?;
    let negotiator = Arc::new(build_negotiator(registry, config));
    let executor = PaymentExecutor::new(negotiator, config.request_timeout())?;

    info!(
        endpoint = %endpoint,
        timeout_ms = config.request_timeout_ms,
        max_amount = ?config.max_payment_amount,
        preferred = ?config.preferred_network,
        "Payment client ready"
    );

    let source = Source {
        url: config.base_url().to_owned(),
        path: config.path(),
    };
    Ok(WeatherTools::new(executor, endpoint, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use solana_keypair::Keypair;
    use solana_signer::Signer;
    use w402::NetworkFamily;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn config(extra: &[&str]) -> Config {
        let mut argv = vec![
            "w402-mcp",
            "--resource-server-url",
            "http://localhost:4021",
            "--endpoint-path",
            "/weather",
        ];
        argv.extend_from_slice(extra);
        let mut config = Config::try_parse_from(argv).unwrap();
        // Ignore keys exported in the test environment.
        if !extra.contains(&"--evm-private-key") {
            config.evm_private_key = None;
        }
        if !extra.contains(&"--svm-private-key") {
            config.svm_private_key = None;
        }
        config
    }

    fn svm_secret() -> String {
        let keypair = Keypair::new_from_array([3u8; 32]);
        let mut bytes = [3u8; 32].to_vec();
        bytes.extend_from_slice(keypair.pubkey().as_ref());
        bs58::encode(bytes).into_string()
    }

    #[test]
    fn test_no_secret_fails_before_tools_exist() {
        let err = bootstrap(&config(&[])).unwrap_err();
        assert!(matches!(
            err,
            StartupError::Credential(CredentialError::Missing)
        ));
    }

    #[test]
    fn test_blank_secret_counts_as_absent() {
        let err = build_registry(&config(&["--evm-private-key", " "])).unwrap_err();
        assert!(matches!(err, CredentialError::Missing));
    }

    #[test]
    fn test_malformed_secret_is_fatal() {
        let err = build_registry(&config(&[
            "--evm-private-key",
            ANVIL_KEY,
            "--svm-private-key",
            "not-base58-0OIl",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            CredentialError::Malformed {
                family: NetworkFamily::Svm,
                ..
            }
        ));
    }

    #[test]
    fn test_registers_both_families() {
        let secret = svm_secret();
        let registry = build_registry(&config(&[
            "--evm-private-key",
            ANVIL_KEY,
            "--svm-private-key",
            &secret,
        ]))
        .unwrap();
        assert_eq!(
            registry.families(),
            vec![NetworkFamily::Evm, NetworkFamily::Svm]
        );
    }

    #[tokio::test]
    async fn test_bootstrap_with_one_secret() {
        let tools = bootstrap(&config(&["--evm-private-key", ANVIL_KEY])).unwrap();
        assert_eq!(tools.endpoint().as_str(), "http://localhost:4021/weather");
    }
}
