//! Unix timestamps for payment authorization windows.
//!
//! Both the ERC-3009 authorization and the Solana authorization carry a
//! `validAfter` / `validBefore` pair expressed as [`UnixTimestamp`]s.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::time::SystemTime;

/// Seconds since the Unix epoch.
///
/// Serialized as a stringified integer, since `JavaScript`'s `Number` cannot
/// safely represent every 64-bit integer:
///
/// ```json
/// "1699999999"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Ord, Eq)]
pub struct UnixTimestamp(u64);

impl Serialize for UnixTimestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for UnixTimestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let ts = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("timestamp must be a non-negative integer"))?;
        Ok(Self(ts))
    }
}

impl Display for UnixTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl UnixTimestamp {
    /// How far in the past `validAfter` is placed, in seconds.
    pub const VALID_AFTER_SKEW_SECS: u64 = 10 * 60;

    /// Creates a new [`UnixTimestamp`] from a raw seconds value.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the current system time as a [`UnixTimestamp`].
    ///
    /// A clock set before the epoch reads as zero.
    #[must_use]
    pub fn now() -> Self {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(now)
    }

    /// Returns the timestamp as raw seconds since the Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns the `(validAfter, validBefore)` window for an authorization
    /// issued now and valid for `max_timeout_seconds`.
    ///
    /// `validAfter` is set in the past so the payment is valid immediately
    /// even when the verifier's clock runs slightly behind.
    #[must_use]
    pub fn validity_window(max_timeout_seconds: u64) -> (Self, Self) {
        let now = Self::now();
        let valid_after = Self(now.0.saturating_sub(Self::VALID_AFTER_SKEW_SECS));
        (valid_after, now + max_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_string() {
        let ts = UnixTimestamp::from_secs(1_699_999_999);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"1699999999\"");
        let back: UnixTimestamp = serde_json::from_str("\"1699999999\"").unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn test_validity_window() {
        let (after, before) = UnixTimestamp::validity_window(60);
        assert_eq!(
            before.as_secs() - after.as_secs(),
            60 + UnixTimestamp::VALID_AFTER_SKEW_SECS
        );
    }
}
