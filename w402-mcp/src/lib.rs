//! MCP tool server for paid x402 resources.
//!
//! Exposes `get-weather` and `get-data-from-resource-server` over MCP stdio.
//! Each tool issues a GET to the configured resource server; when the server
//! answers `402 Payment Required`, the request is paid with the configured
//! EVM or Solana key and replayed once. Every call answers with one JSON
//! envelope, whatever happened upstream.
//!
//! # Modules
//!
//! - [`config`] - Flags and environment variables
//! - [`bootstrap`] - Signer registration and client construction
//! - [`envelope`] - The result envelope and its rendering
//! - [`tools`] - The MCP tool server
//! - [`error`] - Startup errors

pub mod bootstrap;
pub mod config;
pub mod envelope;
pub mod error;
pub mod tools;

pub use bootstrap::bootstrap;
pub use config::Config;
pub use error::StartupError;
pub use tools::WeatherTools;
