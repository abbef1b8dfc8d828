use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

const THREE_ID_PREFIX: &str = "did:3:";

#[derive(Error, Debug)]
pub enum ThreeIdError {
    #[error("Not a 3ID: {0}")]
    NotThreeId(String),

    #[error("3ID body is not valid base58: {0}")]
    InvalidBody(String),
}

/// Stable identifier of an authenticated identity session,
/// in the format: did:3:<base58 digest>
///
/// The body is a base58 rendering of the digest the network derived for
/// the authenticating account; it carries no key material of its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreeId {
    /// The base58-encoded digest body
    digest_part: String,
}

impl ThreeId {
    /// Create a 3ID from an account digest
    pub fn from_digest(digest: &[u8]) -> Self {
        Self {
            digest_part: bs58::encode(digest).into_string(),
        }
    }

    /// Parse a 3ID from its `did:3:<base58>` rendering
    pub fn parse(s: &str) -> Result<Self, ThreeIdError> {
        let body = s.strip_prefix(THREE_ID_PREFIX).ok_or_else(|| {
            ThreeIdError::NotThreeId(format!("'{}' does not start with '{}'", s, THREE_ID_PREFIX))
        })?;

        if body.is_empty() {
            return Err(ThreeIdError::NotThreeId("empty identifier body".into()));
        }
        if body.contains(':') {
            return Err(ThreeIdError::NotThreeId(format!(
                "unexpected ':' in body '{}'",
                body
            )));
        }

        bs58::decode(body)
            .into_vec()
            .map_err(|e| ThreeIdError::InvalidBody(e.to_string()))?;

        Ok(Self {
            digest_part: body.to_string(),
        })
    }

    /// The digest body (base58 encoded)
    pub fn digest_part(&self) -> &str {
        &self.digest_part
    }
}

impl fmt::Display for ThreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", THREE_ID_PREFIX, self.digest_part)
    }
}

impl PartialEq for ThreeId {
    fn eq(&self, other: &Self) -> bool {
        self.digest_part == other.digest_part
    }
}

impl Eq for ThreeId {}

impl Hash for ThreeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest_part.hash(state);
    }
}
