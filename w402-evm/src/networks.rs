//! Known USDC deployments on EVM networks.
//!
//! Used to fill in the EIP-712 domain when a challenge omits `extra.name`
//! and `extra.version`.

use alloy_primitives::{Address, address};

/// Base Mainnet chain ID.
pub const BASE_MAINNET: u64 = 8453;

/// Base Sepolia (testnet) chain ID.
pub const BASE_SEPOLIA: u64 = 84532;

/// Polygon Mainnet chain ID.
pub const POLYGON_MAINNET: u64 = 137;

/// Polygon Amoy (testnet) chain ID.
pub const POLYGON_AMOY: u64 = 80002;

/// Avalanche C-Chain chain ID.
pub const AVALANCHE_MAINNET: u64 = 43114;

/// Avalanche Fuji (testnet) chain ID.
pub const AVALANCHE_FUJI: u64 = 43113;

/// Ethereum Mainnet chain ID.
pub const ETHEREUM_MAINNET: u64 = 1;

/// Celo Mainnet chain ID.
pub const CELO_MAINNET: u64 = 42220;

/// Default EIP-712 domain name for USDC.
pub const DEFAULT_USDC_NAME: &str = "USD Coin";

/// Default EIP-712 domain version for USDC.
pub const DEFAULT_USDC_VERSION: &str = "2";

/// A token contract together with its EIP-712 domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDeployment {
    /// EIP-155 chain id.
    pub chain_id: u64,
    /// Token contract address (the EIP-712 verifying contract).
    pub address: Address,
    /// EIP-712 domain name.
    pub name: &'static str,
    /// EIP-712 domain version.
    pub version: &'static str,
}

const fn usdc(chain_id: u64, address: Address, name: &'static str) -> TokenDeployment {
    TokenDeployment {
        chain_id,
        address,
        name,
        version: DEFAULT_USDC_VERSION,
    }
}

/// Known USDC deployments.
pub static USDC_DEPLOYMENTS: &[TokenDeployment] = &[
    usdc(
        BASE_MAINNET,
        address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
        DEFAULT_USDC_NAME,
    ),
    usdc(
        BASE_SEPOLIA,
        address!("036CbD53842c5426634e7929541eC2318f3dCF7e"),
        "USDC",
    ),
    usdc(
        ETHEREUM_MAINNET,
        address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
        DEFAULT_USDC_NAME,
    ),
    usdc(
        POLYGON_MAINNET,
        address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
        DEFAULT_USDC_NAME,
    ),
    usdc(
        POLYGON_AMOY,
        address!("41E94Eb71Ef8C9fAE0235d1e472b21E21B5a4dbF"),
        "USDC",
    ),
    usdc(
        AVALANCHE_MAINNET,
        address!("B97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E"),
        DEFAULT_USDC_NAME,
    ),
    usdc(
        AVALANCHE_FUJI,
        address!("5425890298aed601595a70AB815c96711a31Bc65"),
        DEFAULT_USDC_NAME,
    ),
    usdc(
        CELO_MAINNET,
        address!("cebA9300f2b948710d2653dD7B07f33A8B32118C"),
        DEFAULT_USDC_NAME,
    ),
];

/// Returns the known deployment of `asset` on `chain_id`, if any.
#[must_use]
pub fn token_deployment(chain_id: u64, asset: Address) -> Option<&'static TokenDeployment> {
    USDC_DEPLOYMENTS
        .iter()
        .find(|d| d.chain_id == chain_id && d.address == asset)
}
