use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

const ADDRESS_PREFIX: &str = "0x";
const ADDRESS_BYTES: usize = 20;

#[derive(Error, Debug)]
pub enum AddressError {
    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    #[error("Invalid address length: expected 40 hex chars, got {0}")]
    InvalidLength(usize),

    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("EIP-55 checksum mismatch")]
    ChecksumMismatch,
}

/// Ethereum-style account address (20 bytes)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    /// Create an address from raw bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }

    /// Parse an address from a 0x-prefixed hex string.
    ///
    /// All-lowercase and all-uppercase hex skips the checksum test;
    /// mixed-case input must carry a valid EIP-55 checksum.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let hex_part = s
            .strip_prefix(ADDRESS_PREFIX)
            .ok_or_else(|| AddressError::InvalidFormat("missing 0x prefix".into()))?;

        if hex_part.len() != ADDRESS_BYTES * 2 {
            return Err(AddressError::InvalidLength(hex_part.len()));
        }

        let bytes = hex::decode(hex_part).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        let mut arr = [0u8; ADDRESS_BYTES];
        arr.copy_from_slice(&bytes);
        let address = Self(arr);

        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        if has_upper && has_lower && address.checksummed() != format!("0x{}", hex_part) {
            return Err(AddressError::ChecksumMismatch);
        }

        Ok(address)
    }

    /// Render the EIP-55 checksummed form
    pub fn checksummed(&self) -> String {
        let lower = hex::encode(self.0);
        let digest = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(2 + ADDRESS_BYTES * 2);
        out.push_str(ADDRESS_PREFIX);
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                digest[i / 2] >> 4
            } else {
                digest[i / 2] & 0x0F
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.checksummed())
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}
