#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Payment-aware HTTP execution for x402 resource servers.
//!
//! [`PaymentMiddleware`] plugs into `reqwest-middleware`: when a response
//! comes back `402 Payment Required`, it decodes the challenge, asks a
//! [`w402::PaymentNegotiator`] for a proof, and replays the request exactly
//! once with the proof attached. When no proof can be produced the original
//! 402 response is handed back untouched.
//!
//! [`PaymentExecutor`] wraps a configured client and classifies each request
//! into an [`Outcome`].
//!
//! # Modules
//!
//! - [`constants`] - Header names
//! - [`headers`] - Challenge and receipt header decoding
//! - [`error`] - Client construction errors
//! - [`outcome`] - Success and failure classification
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

mod client;
pub mod constants;
pub mod error;
mod executor;
pub mod headers;
pub mod outcome;

pub use client::{
    BodyUnread, PaymentDeclined, PaymentMiddleware, ReqwestWithPayments, ReqwestWithPaymentsBuild,
    ReqwestWithPaymentsBuilder,
};
pub use error::HttpError;
pub use executor::PaymentExecutor;
pub use outcome::{ExecutionFailure, Outcome, UpstreamResponse};
