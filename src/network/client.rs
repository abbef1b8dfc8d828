// Identity network client seam
// All protocol framing is delegated to the external network client; this
// crate only owns the trait surface it calls through.

use crate::identity::{AuthCredential, ThreeId};
use async_trait::async_trait;
use thiserror::Error;

/// Content of a stored record: a JSON object of field -> value
pub type RecordContent = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// NETWORK ERRORS
// ============================================================================

/// Errors reported by the identity network
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),

    #[error("Malformed record content: {0}")]
    MalformedRecord(String),

    #[error("Identity network unreachable: {0}")]
    Unreachable(String),
}

// ============================================================================
// IDENTITY NETWORK TRAIT
// ============================================================================

/// Abstract identity network client
#[async_trait]
pub trait IdentityNetwork: Send + Sync {
    /// Exchange an authentication credential for a stable 3ID.
    /// The network verifies the challenge signature carried by the
    /// credential against the account it names.
    async fn authenticate(&self, credential: &AuthCredential) -> Result<ThreeId, NetworkError>;

    /// Fetch a record by well-known name.
    /// Returns `None` when no record has ever been written for the identity.
    async fn get_record(
        &self,
        id: &ThreeId,
        name: &str,
    ) -> Result<Option<RecordContent>, NetworkError>;

    /// Partially update a record: keys present in `patch` overwrite, all
    /// other keys are preserved. Returns the post-merge content.
    async fn merge_record(
        &self,
        id: &ThreeId,
        name: &str,
        patch: RecordContent,
    ) -> Result<RecordContent, NetworkError>;
}
