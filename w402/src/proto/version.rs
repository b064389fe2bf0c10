//! Compile-time protocol version tags.

use std::fmt;

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The `x402Version` field of a message of version `N`.
///
/// Encoded as the bare number. Decoding any other number fails, which keeps
/// a V1 body from being read as V2 and the other way round.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version<const N: u8>;

impl<const N: u8> Version<N> {
    /// The number carried on the wire.
    pub const VALUE: u8 = N;
}

impl<const N: u8> fmt::Display for Version<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&N, f)
    }
}

impl<const N: u8> Serialize for Version<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        N.serialize(serializer)
    }
}

impl<'de, const N: u8> Deserialize<'de> for Version<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            n if n == N => Ok(Self),
            other => Err(D::Error::invalid_value(
                Unexpected::Unsigned(u64::from(other)),
                &format!("x402 version {N}").as_str(),
            )),
        }
    }
}
