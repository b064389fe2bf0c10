//! Network families and chain identifiers.
//!
//! - [`NetworkFamily`] - The closed set of settlement families a signer can serve
//! - [`ChainId`] - A CAIP-2 chain id such as `eip155:84532`

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

use crate::networks;

/// A settlement-network family.
///
/// Every signer capability belongs to exactly one family, and the scheme
/// registry holds at most one capability per family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetworkFamily {
    /// EVM-compatible chains, CAIP-2 namespace `eip155`.
    Evm,
    /// Solana chains, CAIP-2 namespace `solana`.
    Svm,
}

impl NetworkFamily {
    /// All families, in registration order.
    pub const ALL: [Self; 2] = [Self::Evm, Self::Svm];

    /// Returns the CAIP-2 namespace used by chains of this family.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Evm => "eip155",
            Self::Svm => "solana",
        }
    }

    /// Returns the family owning the given CAIP-2 namespace, if any.
    #[must_use]
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.namespace() == namespace)
    }

    /// Returns the short lowercase name (`evm` or `svm`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::Svm => "svm",
        }
    }
}

impl fmt::Display for NetworkFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown network family name.
#[derive(Debug, thiserror::Error)]
#[error("Unknown network family {0}, expected `evm` or `svm`")]
pub struct UnknownNetworkFamily(String);

impl FromStr for NetworkFamily {
    type Err = UnknownNetworkFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evm" | "eip155" => Ok(Self::Evm),
            "svm" | "solana" => Ok(Self::Svm),
            _ => Err(UnknownNetworkFamily(s.into())),
        }
    }
}

impl Serialize for NetworkFamily {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NetworkFamily {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

/// A chain id in CAIP-2 form, `namespace:reference`.
///
/// The namespace selects the [`NetworkFamily`]; the reference is the chain
/// within it (a numeric EIP-155 id, or a Solana genesis hash prefix). On the
/// wire it is the joined string, e.g. `"solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId {
    namespace: String,
    reference: String,
}

impl ChainId {
    /// Joins a namespace and a reference.
    pub fn new<N: Into<String>, R: Into<String>>(namespace: N, reference: R) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }

    /// The part before the colon.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The part after the colon.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the network family of this chain, if the namespace is known.
    #[must_use]
    pub fn family(&self) -> Option<NetworkFamily> {
        NetworkFamily::from_namespace(&self.namespace)
    }

    /// Creates a chain ID from a well-known V1 network name.
    #[must_use]
    pub fn from_network_name(network_name: &str) -> Option<Self> {
        networks::chain_id_by_network_name(network_name)
    }

    /// Returns the well-known V1 network name for this chain ID, if any.
    #[must_use]
    pub fn as_network_name(&self) -> Option<&'static str> {
        networks::network_name_by_chain_id(self)
    }

    /// Resolves a network string as it appears in a challenge.
    ///
    /// CAIP-2 strings are parsed directly; anything else is looked up in the
    /// table of well-known V1 network names.
    #[must_use]
    pub fn resolve(network: &str) -> Option<Self> {
        if network.contains(':') {
            network.parse().ok()
        } else {
            Self::from_network_name(network)
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.to_string()
    }
}

/// A string that is not `namespace:reference` with both parts non-empty.
#[derive(Debug, thiserror::Error)]
#[error("`{0}` is not a CAIP-2 chain id")]
pub struct ChainIdFormatError(String);

impl FromStr for ChainId {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, reference) = s
            .split_once(':')
            .ok_or_else(|| ChainIdFormatError(s.into()))?;
        if namespace.is_empty() || reference.is_empty() {
            return Err(ChainIdFormatError(s.into()));
        }
        Ok(Self::new(namespace, reference))
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_serialize_eip155() {
        let chain_id = ChainId::new("eip155", "1");
        let serialized = serde_json::to_string(&chain_id).unwrap();
        assert_eq!(serialized, "\"eip155:1\"");
    }

    #[test]
    fn test_chain_id_deserialize_solana() {
        let chain_id: ChainId =
            serde_json::from_str("\"solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp\"").unwrap();
        assert_eq!(chain_id.namespace(), "solana");
        assert_eq!(chain_id.reference(), "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp");
        assert_eq!(chain_id.family(), Some(NetworkFamily::Svm));
    }

    #[test]
    fn test_chain_id_rejects_malformed() {
        assert!("invalid".parse::<ChainId>().is_err());
        assert!(":1".parse::<ChainId>().is_err());
        assert!("eip155:".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_chain_id_unknown_namespace_has_no_family() {
        let chain_id: ChainId = "cosmos:hub-4".parse().unwrap();
        assert!(chain_id.family().is_none());
    }

    #[test]
    fn test_resolve_v1_name_and_caip2() {
        let base = ChainId::resolve("base-sepolia").unwrap();
        assert_eq!(base, ChainId::new("eip155", "84532"));
        assert_eq!(base.family(), Some(NetworkFamily::Evm));

        let caip = ChainId::resolve("eip155:8453").unwrap();
        assert_eq!(caip.as_network_name(), Some("base"));

        assert!(ChainId::resolve("not-a-network").is_none());
    }

    #[test]
    fn test_family_parse_and_display() {
        assert_eq!("EVM".parse::<NetworkFamily>().unwrap(), NetworkFamily::Evm);
        assert_eq!("solana".parse::<NetworkFamily>().unwrap(), NetworkFamily::Svm);
        assert!("btc".parse::<NetworkFamily>().is_err());
        assert_eq!(NetworkFamily::Svm.to_string(), "svm");
        assert_eq!(NetworkFamily::Evm.namespace(), "eip155");
    }
}
