#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Solana signer capability for w402.
//!
//! [`SvmSigner`] answers `exact` payment options on Solana networks with an
//! ed25519 signature over a transfer authorization built from the selected
//! option. No RPC access is needed.
//!
//! This proof is not the x402 `exact` SVM payload, which is a partially
//! signed transfer transaction. Facilitators that verify the standard
//! payload will reject it; it is only accepted by resource servers that
//! check the signed authorization themselves.
//!
//! - [`exact`] - Authorization types and the signing routine
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod exact;
mod signer;

pub use signer::SvmSigner;
