//! # Value Objects
//!
//! Immutable domain primitives for the name registry.
//! These types represent concepts that are defined by their value, not identity.

use crate::errors::RegistryError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for exact payment arithmetic
pub use primitive_types::U256;

/// Payment amount in the smallest currency unit. Never floating point.
pub type Amount = U256;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Sequential token identifier, allocated from 0.
pub type TokenId = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account identity.
///
/// Serialized as a `0x`-prefixed lowercase hex string so that it reads
/// naturally in TOML configuration and JSON events.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Full `0x`-prefixed hex form.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Error returned when parsing an [`Address`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// Input is not valid hex.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
    /// Decoded byte length is not 20.
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes =
            hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes).ok_or(AddressParseError::InvalidLength(bytes.len()))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

// =============================================================================
// DOMAIN NAME
// =============================================================================

/// A registrable domain name.
///
/// Construction checks, in order:
/// 1. length in characters ≤ `max_len` (`NameTooLong`)
/// 2. non-empty (`InvalidName`)
/// 3. ASCII letters, digits and `-` only, no leading/trailing `-` (`InvalidName`)
///
/// Names are case-sensitive keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainName(String);

impl DomainName {
    /// Validate `raw` against the charset and `max_len`.
    ///
    /// # Errors
    ///
    /// `NameTooLong` or `InvalidName`.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, RegistryError> {
        let length = raw.chars().count();
        if length > max_len {
            return Err(RegistryError::NameTooLong {
                length,
                max: max_len,
            });
        }
        if raw.is_empty() {
            return Err(RegistryError::InvalidName {
                name: String::new(),
                reason: "name is empty".to_string(),
            });
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
        {
            return Err(RegistryError::InvalidName {
                name: raw.to_string(),
                reason: format!("character {bad:?} is not allowed"),
            });
        }
        if raw.starts_with('-') || raw.ends_with('-') {
            return Err(RegistryError::InvalidName {
                name: raw.to_string(),
                reason: "name may not start or end with '-'".to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    /// Always false for a parsed name; present for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert a whole-unit decimal fraction (`units × 10^-decimals`) into an
/// [`Amount`] with 18 decimals. Used for price defaults.
#[must_use]
pub fn units_to_amount(units: u64, decimals: u32) -> Amount {
    let scale = 18u32.saturating_sub(decimals);
    U256::from(units) * U256::exp10(scale as usize)
}

// =============================================================================
// TESTS
// =============================================================================
