#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for paying x402 resource servers on behalf of a caller.
//!
//! A resource server answers an unpaid request with `402 Payment Required`
//! and a challenge listing the payment options it accepts. This crate holds
//! everything needed to turn such a challenge into a signed proof, without
//! touching the network:
//!
//! - [`chain`] - Network families and CAIP-2 chain identifiers
//! - [`networks`] - Well-known V1 network names and their chain ids
//! - [`proto`] - Wire format of challenges and payment payloads (V1 and V2)
//! - [`scheme`] - The signer capability trait, the scheme registry, and selectors
//! - [`client`] - The payment negotiator producing a [`client::PaymentProof`]
//! - [`error`] - Credential, negotiation, and scheme error types
//!
//! Chain-specific signers live in `w402-evm` and `w402-svm`; the HTTP retry
//! layer lives in `w402-http`.
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod chain;
pub mod client;
pub mod encoding;
pub mod error;
pub mod networks;
pub mod proto;
pub mod scheme;
pub mod timestamp;

pub use chain::{ChainId, NetworkFamily};
pub use client::{PaymentNegotiator, PaymentProof};
pub use error::{CredentialError, NegotiationError, SchemeError, UnsupportedSchemeError};
pub use proto::{PaymentRequired, ProtocolError};
pub use scheme::{PaymentOption, SchemeRegistry, SchemeSigner};
