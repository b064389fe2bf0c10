//! The reqwest middleware that answers `402 Payment Required` once.

use std::sync::Arc;

use http::{Extensions, HeaderMap, HeaderName, HeaderValue, StatusCode, Version};
use reqwest::{Request, Response};
use reqwest_middleware as rqm;
#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument, trace, warn};
use w402::PaymentNegotiator;

use crate::headers::parse_challenge;
use crate::outcome::error_chain;

/// Response extension set when a 402 was handed back without paying.
///
/// Carries the reason negotiation was abandoned, so callers can explain the
/// failure without re-parsing the challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDeclined(pub String);

/// Response extension set when the body of a 402 could not be read.
///
/// The handed-back response keeps status and headers but has an empty body;
/// the value describes the read error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyUnread(pub String);

/// Middleware that pays for a request when the server asks for it.
///
/// On a 402 response the challenge is decoded, a proof is negotiated, and the
/// request is replayed exactly once with the proof header. The retry's
/// response is returned whatever its status. When no proof can be produced
/// the original 402 response is returned with a [`PaymentDeclined`]
/// extension; when its body cannot be read, with a [`BodyUnread`] one.
#[derive(Debug, Clone)]
pub struct PaymentMiddleware {
    negotiator: Arc<PaymentNegotiator>,
}

impl PaymentMiddleware {
    /// Creates the middleware around a shared negotiator.
    #[must_use]
    pub const fn new(negotiator: Arc<PaymentNegotiator>) -> Self {
        Self { negotiator }
    }

    /// Builds the headers to attach to the retry, or the reason not to retry.
    async fn proof_headers(&self, recorded: &RecordedResponse) -> Result<HeaderMap, String> {
        let challenge = parse_challenge(&recorded.headers, &recorded.body)
            .map_err(|e| format!("malformed payment challenge: {e}"))?;
        let proof = self
            .negotiator
            .negotiate(&challenge)
            .await
            .map_err(|e| e.to_string())?;

        #[cfg(feature = "telemetry")]
        info!(
            family = %proof.family,
            network = %proof.network,
            amount = %proof.amount,
            payer = %proof.payer,
            "Payment proof created"
        );

        let name = HeaderName::from_bytes(proof.header.as_bytes())
            .map_err(|e| format!("invalid proof header name: {e}"))?;
        let value = HeaderValue::from_str(&proof.value)
            .map_err(|e| format!("invalid proof header value: {e}"))?;
        let mut headers = HeaderMap::new();
        headers.insert(name, value);
        Ok(headers)
    }
}

/// The parts of a 402 response, kept so it can be handed back after the
/// body has been read.
#[derive(Debug)]
struct RecordedResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl RecordedResponse {
    /// Reads the body, or hands back a bodiless response marked [`BodyUnread`].
    async fn read(response: Response) -> Result<Self, Response> {
        let mut recorded = Self {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            body: Vec::new(),
        };
        match response.bytes().await {
            Ok(body) => {
                recorded.body = body.to_vec();
                Ok(recorded)
            }
            Err(err) => Err(recorded.rebuild(BodyUnread(error_chain(&err)))),
        }
    }

    /// Rebuilds the response, marking it as declined.
    fn into_declined(self, reason: String) -> Response {
        self.rebuild(PaymentDeclined(reason))
    }

    fn rebuild<T: Clone + Send + Sync + 'static>(self, marker: T) -> Response {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers;
        response.extensions_mut().insert(marker);
        Response::from(response)
    }
}

/// Runs the next middleware or HTTP client with optional telemetry instrumentation.
#[cfg_attr(feature = "telemetry", instrument(name = "w402.reqwest.next", skip_all))]
async fn run_next(
    next: rqm::Next<'_>,
    req: Request,
    extensions: &mut Extensions,
) -> rqm::Result<Response> {
    next.run(req, extensions).await
}

#[async_trait::async_trait]
impl rqm::Middleware for PaymentMiddleware {
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "w402.reqwest.handle", skip_all, fields(url = %req.url()))
    )]
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: rqm::Next<'_>,
    ) -> rqm::Result<Response> {
        let retry_req = req.try_clone();
        let res = run_next(next.clone(), req, extensions).await?;

        if res.status() != StatusCode::PAYMENT_REQUIRED {
            #[cfg(feature = "telemetry")]
            trace!(status = %res.status(), "No payment required, returning response");
            return Ok(res);
        }

        #[cfg(feature = "telemetry")]
        info!("Received 402 Payment Required, negotiating payment");

        let recorded = match RecordedResponse::read(res).await {
            Ok(recorded) => recorded,
            Err(unread) => {
                #[cfg(feature = "telemetry")]
                warn!("Failed to read 402 body, returning it without one");
                return Ok(unread);
            }
        };

        let Some(mut retry) = retry_req else {
            #[cfg(feature = "telemetry")]
            warn!("Request body cannot be replayed, returning 402");
            return Ok(recorded.into_declined("request cannot be retried".to_owned()));
        };

        let headers = match self.proof_headers(&recorded).await {
            Ok(headers) => headers,
            Err(reason) => {
                #[cfg(feature = "telemetry")]
                warn!(%reason, "Payment negotiation failed, returning 402");
                return Ok(recorded.into_declined(reason));
            }
        };
        retry.headers_mut().extend(headers);

        #[cfg(feature = "telemetry")]
        debug!("Retrying request with payment proof");

        let res = run_next(next, retry, extensions).await?;

        #[cfg(feature = "telemetry")]
        debug!(status = %res.status(), "Paid retry completed");

        Ok(res)
    }
}
