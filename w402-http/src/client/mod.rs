//! Reqwest integration for x402 payments.
//!
//! [`ReqwestWithPayments`] layers a [`PaymentMiddleware`] over a
//! [`ClientBuilder`]:
//!
//! ```ignore
//! let client = reqwest::Client::builder().with_payments(negotiator).build()?;
//! ```

mod middleware;

pub use middleware::{BodyUnread, PaymentDeclined, PaymentMiddleware};

use std::sync::Arc;

use reqwest::ClientBuilder;
use reqwest_middleware as rqm;
use w402::PaymentNegotiator;

/// Trait for adding x402 payment handling to reqwest clients.
pub trait ReqwestWithPayments<A> {
    /// Adds the payment middleware to the client or builder.
    fn with_payments(self, negotiator: Arc<PaymentNegotiator>) -> ReqwestWithPaymentsBuilder<A>;
}

impl ReqwestWithPayments<Self> for ClientBuilder {
    fn with_payments(self, negotiator: Arc<PaymentNegotiator>) -> ReqwestWithPaymentsBuilder<Self> {
        ReqwestWithPaymentsBuilder {
            inner: self,
            middleware: PaymentMiddleware::new(negotiator),
        }
    }
}

/// Builder for a reqwest client with the payment middleware.
#[allow(missing_debug_implementations)] // ClientBuilder does not implement Debug usefully
pub struct ReqwestWithPaymentsBuilder<A> {
    inner: A,
    middleware: PaymentMiddleware,
}

/// Trait for building the final client from a [`ReqwestWithPaymentsBuilder`].
pub trait ReqwestWithPaymentsBuild {
    /// The type returned by [`build`](Self::build).
    type BuildResult;
    /// The type returned by [`builder`](Self::builder).
    type BuilderResult;

    /// Builds the client, consuming the builder.
    fn build(self) -> Self::BuildResult;

    /// Returns the middleware client builder with the payment layer added.
    fn builder(self) -> Self::BuilderResult;
}

impl ReqwestWithPaymentsBuild for ReqwestWithPaymentsBuilder<ClientBuilder> {
    type BuildResult = Result<rqm::ClientWithMiddleware, reqwest::Error>;
    type BuilderResult = Result<rqm::ClientBuilder, reqwest::Error>;

    fn build(self) -> Self::BuildResult {
        let builder = self.builder()?;
        Ok(builder.build())
    }

    fn builder(self) -> Self::BuilderResult {
        let client = self.inner.build()?;
        Ok(rqm::ClientBuilder::new(client).with(self.middleware))
    }
}
