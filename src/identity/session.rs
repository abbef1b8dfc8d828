use crate::identity::ThreeId;
use crate::network::NetworkError;
use crate::wallet::WalletError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

// ============================================================================
// SESSION ERRORS
// ============================================================================

/// Errors surfaced by session bootstrap
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("A connect attempt is already in flight")]
    AlreadyConnecting,

    #[error("Session is already connected")]
    AlreadyConnected,

    #[error("Identity network did not respond within {0:?}")]
    Timeout(Duration),

    #[error("Credential address does not match the provider handle")]
    InvalidCredential,

    #[error("Invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },

    #[error("Wallet error during session bootstrap: {0}")]
    Wallet(#[from] WalletError),

    #[error("Identity network error: {0}")]
    Network(#[from] NetworkError),
}

// ============================================================================
// SESSION STATUS
// ============================================================================

/// Status of the identity session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Connected,
    Failed,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Idle
    }
}

impl SessionStatus {
    /// Check if transition to another status is valid
    pub fn can_transition_to(&self, target: &SessionStatus) -> bool {
        match (self, target) {
            (Self::Idle, Self::Connecting) => true,
            (Self::Connecting, Self::Connected) => true,
            (Self::Connecting, Self::Failed) => true,
            (Self::Connected, Self::Idle) => true, // Explicit disconnect
            (Self::Failed, Self::Connecting) => true, // User re-initiated
            (Self::Failed, Self::Idle) => true,
            _ => false,
        }
    }

    /// Check if the session is authenticated
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if a bootstrap attempt is in flight
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

// ============================================================================
// IDENTITY SESSION
// ============================================================================

/// An authenticated identity session.
///
/// Created by a successful bootstrap call, destroyed on explicit disconnect.
/// Not persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySession {
    id: ThreeId,
    connected_at: u64,
}

impl IdentitySession {
    /// Create a session for a freshly authenticated identity
    pub fn new(id: ThreeId) -> Self {
        Self {
            id,
            connected_at: Self::now(),
        }
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// The stable session identifier
    pub fn id(&self) -> &ThreeId {
        &self.id
    }

    /// When the session was established (unix seconds)
    pub fn connected_at(&self) -> u64 {
        self.connected_at
    }
}
