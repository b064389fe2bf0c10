//! Base64 helpers for x402 header values.
//!
//! Challenges in the `PAYMENT-REQUIRED` header and proofs in the
//! `X-PAYMENT` / `PAYMENT-SIGNATURE` headers are base64-encoded JSON.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{self, Display, Formatter};

/// A wrapper for base64-encoded byte data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Bytes(pub Vec<u8>);

impl Base64Bytes {
    /// Decodes the base64 string bytes to raw binary data.
    ///
    /// Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        b64.decode(self.0.trim_ascii())
    }

    /// Encodes raw binary data into base64 string bytes.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Self {
        let encoded = b64.encode(input.as_ref());
        Self(encoded.into_bytes())
    }

    /// Serializes `value` to JSON and encodes the result.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn encode_json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_vec(value)?;
        Ok(Self::encode(json))
    }

    /// Decodes the bytes and parses them as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProtocolError`] on base64 or JSON failure.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, crate::ProtocolError> {
        let bytes = self.decode()?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl AsRef<[u8]> for Base64Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }
}

impl From<&str> for Base64Bytes {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl Display for Base64Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}
