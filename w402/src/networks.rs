//! Well-known network names.
//!
//! V1 challenges name their network with a human-readable string
//! (e.g., `"base-sepolia"`) while V2 challenges use CAIP-2 identifiers
//! (e.g., `eip155:84532`). This table maps between the two.

use crate::chain::ChainId;

/// A known network definition with its chain ID and human-readable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Human-readable network name (e.g., "base-sepolia", "solana")
    pub name: &'static str,
    /// CAIP-2 namespace (e.g., "eip155", "solana")
    pub namespace: &'static str,
    /// Chain reference (e.g., "84532" for Base Sepolia)
    pub reference: &'static str,
}

impl NetworkInfo {
    /// Create a `ChainId` from this network info
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.namespace, self.reference)
    }

    fn matches(&self, chain_id: &ChainId) -> bool {
        self.namespace == chain_id.namespace() && self.reference == chain_id.reference()
    }
}

const fn network(
    name: &'static str,
    namespace: &'static str,
    reference: &'static str,
) -> NetworkInfo {
    NetworkInfo {
        name,
        namespace,
        reference,
    }
}

/// Networks with a V1 name.
pub static KNOWN_NETWORKS: &[NetworkInfo] = &[
    network("ethereum", "eip155", "1"),
    network("sepolia", "eip155", "11155111"),
    network("base", "eip155", "8453"),
    network("base-sepolia", "eip155", "84532"),
    network("polygon", "eip155", "137"),
    network("polygon-amoy", "eip155", "80002"),
    network("avalanche", "eip155", "43114"),
    network("avalanche-fuji", "eip155", "43113"),
    network("celo", "eip155", "42220"),
    network("celo-sepolia", "eip155", "11142220"),
    network("sei", "eip155", "1329"),
    network("sei-testnet", "eip155", "1328"),
    network("xdc", "eip155", "50"),
    network("iotex", "eip155", "4689"),
    network("solana", "solana", "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp"),
    network("solana-devnet", "solana", "EtWTRABZaYq6iMfeYKouRu166VU2xqa1"),
];

/// Looks up a [`ChainId`] by its V1 network name.
#[must_use]
pub fn chain_id_by_network_name(name: &str) -> Option<ChainId> {
    KNOWN_NETWORKS
        .iter()
        .find(|n| n.name == name)
        .map(NetworkInfo::chain_id)
}

/// Looks up a V1 network name by its [`ChainId`].
#[must_use]
pub fn network_name_by_chain_id(chain_id: &ChainId) -> Option<&'static str> {
    KNOWN_NETWORKS
        .iter()
        .find(|n| n.matches(chain_id))
        .map(|n| n.name)
}
