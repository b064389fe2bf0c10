use std::sync::Arc;
use std::time::Duration;

use reqwest_middleware::ClientWithMiddleware;
use url::Url;
use w402::PaymentNegotiator;

use crate::client::{BodyUnread, PaymentDeclined, ReqwestWithPayments, ReqwestWithPaymentsBuild};
use crate::error::HttpError;
use crate::outcome::{Outcome, UpstreamResponse};

/// Sends payment-aware requests and classifies their results.
///
/// Holds no per-request state; one executor serves concurrent calls.
#[derive(Debug, Clone)]
pub struct PaymentExecutor {
    client: ClientWithMiddleware,
}

impl PaymentExecutor {
    /// Builds an executor whose every attempt is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Client`] if the HTTP client cannot be built.
    pub fn new(negotiator: Arc<PaymentNegotiator>, timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .with_payments(negotiator)
            .build()?;
        Ok(Self::from_client(client))
    }

    /// Wraps an already configured client.
    #[must_use]
    pub const fn from_client(client: ClientWithMiddleware) -> Self {
        Self { client }
    }

    /// Sends a GET request to `url` and classifies the result.
    ///
    /// Never fails: transport errors become [`Outcome::Failed`].
    #[cfg_attr(
        feature = "telemetry",
        tracing::instrument(name = "w402.execute", skip_all, fields(url = %url))
    )]
    pub async fn get(&self, url: Url) -> Outcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                #[cfg(feature = "telemetry")]
                tracing::warn!(error = %err, "Upstream request failed");
                return Outcome::from_transport_error(&err);
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let declined = response.extensions().get::<PaymentDeclined>().cloned();

        #[cfg(feature = "telemetry")]
        tracing::info!(status = %status, "Upstream responded");

        if let Some(BodyUnread(detail)) = response.extensions().get::<BodyUnread>() {
            return Outcome::from_unread_body(status, headers, detail);
        }

        match response.bytes().await {
            Ok(body) => Outcome::from_response(
                UpstreamResponse {
                    status,
                    headers,
                    body: body.to_vec(),
                },
                declined.as_ref(),
            ),
            Err(err) => Outcome::from_body_error(status, headers, &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PAYMENT_RESPONSE_HEADER, X_PAYMENT_RESPONSE_HEADER};
    use crate::headers::PaymentReceipts;
    use serde_json::{Value, json};
    use solana_keypair::Keypair;
    use solana_signer::Signer;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use w402::SchemeRegistry;
    use w402::encoding::Base64Bytes;
    use w402_evm::EvmSigner;
    use w402_svm::SvmSigner;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn evm_executor(timeout: Duration) -> PaymentExecutor {
        let registry = SchemeRegistry::new()
            .with(EvmSigner::from_secret(ANVIL_KEY).unwrap())
            .into_shared()
            .unwrap();
        PaymentExecutor::new(Arc::new(PaymentNegotiator::new(registry)), timeout).unwrap()
    }

    fn svm_only_executor() -> PaymentExecutor {
        let keypair = Keypair::new_from_array([5u8; 32]);
        let mut bytes = [5u8; 32].to_vec();
        bytes.extend_from_slice(keypair.pubkey().as_ref());
        let secret = bs58::encode(bytes).into_string();
        let registry = SchemeRegistry::new()
            .with(SvmSigner::from_secret(&secret).unwrap())
            .into_shared()
            .unwrap();
        PaymentExecutor::new(
            Arc::new(PaymentNegotiator::new(registry)),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn v1_challenge() -> Value {
        json!({
            "x402Version": 1,
            "error": "X-PAYMENT header is required",
            "accepts": [{
                "scheme": "exact",
                "network": "base-sepolia",
                "maxAmountRequired": "10000",
                "resource": "http://localhost/weather",
                "description": "Weather data",
                "mimeType": "application/json",
                "payTo": "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
                "maxTimeoutSeconds": 60,
                "asset": "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
                "extra": { "name": "USDC", "version": "2" }
            }]
        })
    }

    fn v2_challenge() -> Value {
        json!({
            "x402Version": 2,
            "resource": { "url": "http://localhost/weather" },
            "accepts": [{
                "scheme": "exact",
                "network": "eip155:84532",
                "amount": "10000",
                "payTo": "0x209693Bc6afc0C5328bA36FaF03C514EF312287C",
                "maxTimeoutSeconds": 60,
                "asset": "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
                "extra": { "name": "USDC", "version": "2" }
            }]
        })
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{p}", server.uri())).unwrap()
    }

    /// Answers one request with `response` written verbatim, then closes.
    async fn raw_server(response: Vec<u8>) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            socket.write_all(&response).await.unwrap();
            let _ = socket.shutdown().await;
        });
        Url::parse(&format!("http://{addr}/weather")).unwrap()
    }

    #[tokio::test]
    async fn test_200_passes_through_without_payment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "temp": 21 })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_secs(5))
            .get(url(&server, "/weather"))
            .await;
        let Outcome::Succeeded(response) = outcome else {
            panic!("expected success");
        };
        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(
            serde_json::from_slice::<Value>(&response.body).unwrap(),
            json!({ "temp": 21 })
        );
    }

    #[tokio::test]
    async fn test_server_error_is_not_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_secs(5))
            .get(url(&server, "/weather"))
            .await;
        assert!(outcome.is_success());
        assert_eq!(outcome.status().map(|s| s.as_u16()), Some(500));
    }

    #[tokio::test]
    async fn test_v1_body_challenge_is_paid_and_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("x-payment"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(X_PAYMENT_RESPONSE_HEADER, "settled")
                    .set_body_json(json!({ "temp": 21 })),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(402).set_body_json(v1_challenge()))
            .with_priority(2)
            .expect(1)
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_secs(5))
            .get(url(&server, "/weather"))
            .await;
        let Outcome::Succeeded(response) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(response.status.as_u16(), 200);
        let receipts = PaymentReceipts::from_headers(&response.headers);
        assert_eq!(receipts.x_payment_response.as_deref(), Some("settled"));

        let requests = server.received_requests().await.unwrap();
        let proof = requests[1].headers.get("x-payment").unwrap();
        let decoded: Value = Base64Bytes::from(proof.as_bytes()).decode_json().unwrap();
        assert_eq!(decoded["x402Version"], 1);
        assert_eq!(decoded["network"], "base-sepolia");
        assert_eq!(
            decoded["payload"]["authorization"]["from"].as_str().unwrap().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn test_v2_header_challenge_uses_payment_signature() {
        let server = MockServer::start().await;
        let encoded = Base64Bytes::encode_json(&v2_challenge()).unwrap().to_string();
        Mock::given(method("GET"))
            .and(header_exists("payment-signature"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(PAYMENT_RESPONSE_HEADER, "receipt")
                    .set_body_string("sunny"),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(402).insert_header("PAYMENT-REQUIRED", encoded))
            .with_priority(2)
            .expect(1)
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_secs(5))
            .get(url(&server, "/weather"))
            .await;
        let Outcome::Succeeded(response) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(response.body, b"sunny");
        assert_eq!(
            PaymentReceipts::from_headers(&response.headers)
                .payment_response
                .as_deref(),
            Some("receipt")
        );

        let requests = server.received_requests().await.unwrap();
        let proof = requests[1].headers.get("payment-signature").unwrap();
        let decoded: Value = Base64Bytes::from(proof.as_bytes()).decode_json().unwrap();
        assert_eq!(decoded["x402Version"], 2);
        assert_eq!(decoded["accepted"]["network"], "eip155:84532");
        assert_eq!(decoded["resource"]["url"], "http://localhost/weather");
    }

    #[tokio::test]
    async fn test_second_402_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(402).set_body_json(v1_challenge()))
            .expect(2)
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_secs(5))
            .get(url(&server, "/weather"))
            .await;
        let Outcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.status.map(|s| s.as_u16()), Some(402));
        assert!(failure.message.contains("rejected the payment"));
    }

    #[tokio::test]
    async fn test_unsupported_family_returns_original_402() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(402).set_body_json(v1_challenge()))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = svm_only_executor().get(url(&server, "/weather")).await;
        let Outcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.status.map(|s| s.as_u16()), Some(402));
        let body: Value = serde_json::from_slice(failure.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, v1_challenge());
        assert!(failure.message.contains("no registered signer"));
    }

    #[tokio::test]
    async fn test_malformed_challenge_returns_original_402() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(402).set_body_string("pay up"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_secs(5))
            .get(url(&server, "/weather"))
            .await;
        let Outcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(failure.body.as_deref(), Some(&b"pay up"[..]));
        assert!(failure.message.contains("malformed payment challenge"));
    }

    #[tokio::test]
    async fn test_timeout_is_failed_without_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let outcome = evm_executor(Duration::from_millis(50))
            .get(url(&server, "/weather"))
            .await;
        let Outcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(failure.status.is_none());
        assert!(failure.body.is_none());
        assert!(failure.message.contains("timed out"), "{}", failure.message);
    }

    #[tokio::test]
    async fn test_connection_refused_is_failed_without_status() {
        let server = MockServer::start().await;
        let target = url(&server, "/weather");
        drop(server);

        let outcome = evm_executor(Duration::from_secs(5)).get(target).await;
        let Outcome::Failed(failure) = outcome else {
            panic!("expected failure");
        };
        assert!(failure.status.is_none());
        assert!(failure.message.starts_with("request failed"));
    }

    #[tokio::test]
    async fn test_truncated_402_keeps_status_and_headers() {
        let target = raw_server(
            b"HTTP/1.1 402 Payment Required\r\n\
              content-type: application/json\r\n\
              content-length: 256\r\n\
              PAYMENT-RESPONSE: partial\r\n\
              \r\n\
              {\"x402Version\":1,\"acc"
                .to_vec(),
        )
        .await;

        let outcome = evm_executor(Duration::from_secs(5)).get(target).await;
        let Outcome::Failed(failure) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(failure.status.map(|s| s.as_u16()), Some(402));
        assert!(failure.body.is_none());
        let headers = failure.headers.as_ref().unwrap();
        assert_eq!(
            PaymentReceipts::from_headers(headers).payment_response.as_deref(),
            Some("partial")
        );
        assert!(
            failure.message.starts_with("failed to read response body"),
            "{}",
            failure.message
        );
    }

    #[tokio::test]
    async fn test_receipt_header_casing_on_the_wire() {
        for name in ["Payment-Response", "payment-response", "PAYMENT-RESPONSE"] {
            let response = format!(
                "HTTP/1.1 200 OK\r\n{name}: settled\r\nX-PAYMENT-Response: legacy\r\n\
                 content-length: 2\r\nconnection: close\r\n\r\n{{}}"
            );
            let target = raw_server(response.into_bytes()).await;

            let outcome = evm_executor(Duration::from_secs(5)).get(target).await;
            let receipts = PaymentReceipts::from_headers(outcome.headers().unwrap());
            assert_eq!(receipts.payment_response.as_deref(), Some("settled"), "{name}");
            assert_eq!(receipts.x_payment_response.as_deref(), Some("legacy"), "{name}");
        }
    }
}
