#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EVM signer capability for w402.
//!
//! [`EvmSigner`] answers `exact` payment options on EIP-155 chains by signing
//! an ERC-3009 `transferWithAuthorization` with EIP-712. Signing is fully
//! offline: no RPC endpoint is needed.
//!
//! - [`exact`] - Authorization types and the EIP-712 signing routine
//! - [`networks`] - Known USDC deployments and their EIP-712 domains
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod exact;
pub mod networks;
mod signer;

pub use signer::EvmSigner;
