// Profile record access
// A record handle is scoped 1:1 to an identity session. It keeps a local
// content cache that successful merges refresh, so reads after a write
// need no extra round trip.

use crate::identity::{SessionStatus, ThreeId};
use crate::network::{IdentityNetwork, NetworkError, RecordContent};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::debug;

/// Well-known name of the profile record
pub const BASIC_PROFILE: &str = "basicProfile";

// ============================================================================
// RECORD ERRORS
// ============================================================================

/// Errors surfaced by record access
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("No connected identity session")]
    NotConnected,

    #[error("Identity network rejected the write: {0}")]
    WriteRejected(String),

    #[error("Identity network error: {0}")]
    Network(String),
}

impl From<NetworkError> for RecordError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::WriteRejected(message) => RecordError::WriteRejected(message),
            other => RecordError::Network(other.to_string()),
        }
    }
}

// ============================================================================
// RECORD HANDLE
// ============================================================================

/// Handle to one named record of one identity.
///
/// Observes the session status through the controller's watch channel; any
/// operation while the session is not connected fails before reaching the
/// network.
pub struct RecordHandle {
    network: Arc<dyn IdentityNetwork>,
    id: ThreeId,
    name: String,
    status: watch::Receiver<SessionStatus>,
    content: Option<RecordContent>,
    loaded: bool,
}

impl RecordHandle {
    /// Create a handle for a named record of the given identity
    pub fn new(
        network: Arc<dyn IdentityNetwork>,
        id: ThreeId,
        name: &str,
        status: watch::Receiver<SessionStatus>,
    ) -> Self {
        Self {
            network,
            id,
            name: name.to_string(),
            status,
            content: None,
            loaded: false,
        }
    }

    /// The identity this record belongs to
    pub fn id(&self) -> &ThreeId {
        &self.id
    }

    /// The well-known record name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the initial fetch has completed
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Current cached content; `None` when the identity has no record yet
    pub fn read(&self) -> Option<&RecordContent> {
        self.content.as_ref()
    }

    /// Convenience lookup of a single field in the cached content
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.content.as_ref()?.get(key)
    }

    /// Fetch the record content from the network into the local cache
    pub async fn load(&mut self) -> Result<(), RecordError> {
        self.ensure_connected()?;

        let content = self.network.get_record(&self.id, &self.name).await?;
        debug!(id = %self.id, record = %self.name, present = content.is_some(), "record loaded");
        self.content = content;
        self.loaded = true;
        Ok(())
    }

    /// Partially update the record.
    ///
    /// Keys present in `patch` overwrite, all other keys are preserved. On
    /// success the local cache is refreshed from the merge result.
    pub async fn merge(&mut self, patch: RecordContent) -> Result<(), RecordError> {
        self.ensure_connected()?;

        let updated = self
            .network
            .merge_record(&self.id, &self.name, patch)
            .await?;
        debug!(id = %self.id, record = %self.name, fields = updated.len(), "record merged");
        self.content = Some(updated);
        Ok(())
    }

    fn ensure_connected(&self) -> Result<(), RecordError> {
        if !self.status.borrow().is_connected() {
            return Err(RecordError::NotConnected);
        }
        Ok(())
    }
}
