// Session bootstrap - drives idle -> connecting -> {connected, failed}
// Exchanges an acquired signing capability for an authenticated 3ID session.

use crate::identity::{AuthCredential, IdentitySession, SessionError, SessionStatus, ThreeId};
use crate::network::IdentityNetwork;
use crate::wallet::SigningCapability;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

// ============================================================================
// SESSION CONFIG
// ============================================================================

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for session bootstrap
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Bound on the whole bootstrap call (challenge signing + network
    /// authentication). The underlying calls have no deadline of their own.
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

// ============================================================================
// SESSION CONTROLLER
// ============================================================================

/// Single-owner controller for the identity session.
///
/// Publishes status transitions through a watch channel so the view layer
/// can re-render on every change. All collaborator calls are awaited to
/// completion; there is no automatic retry.
pub struct SessionController {
    network: Arc<dyn IdentityNetwork>,
    config: SessionConfig,
    session: Mutex<Option<IdentitySession>>,
    status_tx: watch::Sender<SessionStatus>,
}

impl SessionController {
    /// Create a controller over the given identity network
    pub fn new(network: Arc<dyn IdentityNetwork>, config: SessionConfig) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        Self {
            network,
            config,
            session: Mutex::new(None),
            status_tx,
        }
    }

    /// Current session status
    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to status transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// The authenticated session, if connected
    pub fn session(&self) -> Option<IdentitySession> {
        self.session_guard().clone()
    }

    /// The stable session identifier, if connected
    pub fn three_id(&self) -> Option<ThreeId> {
        self.session_guard().as_ref().map(|s| s.id().clone())
    }

    /// Exchange a signing capability for an authenticated session.
    ///
    /// Exactly one idle/failed -> connecting transition happens per attempt;
    /// a concurrent call while connecting fails fast without touching the
    /// network. On any failure the status lands in `Failed` and the caller
    /// must re-initiate.
    pub async fn connect(&self, capability: &SigningCapability) -> Result<ThreeId, SessionError> {
        if !self.try_transition(SessionStatus::Connecting) {
            return match self.status() {
                SessionStatus::Connected => Err(SessionError::AlreadyConnected),
                _ => Err(SessionError::AlreadyConnecting),
            };
        }

        let deadline = self.config.connect_timeout;
        let result = match tokio::time::timeout(deadline, self.bootstrap(capability)).await {
            Ok(inner) => inner,
            Err(_) => Err(SessionError::Timeout(deadline)),
        };

        match result {
            Ok(id) => {
                *self.session_guard() = Some(IdentitySession::new(id.clone()));
                self.force_transition(SessionStatus::Connected);
                info!(%id, "identity session established");
                Ok(id)
            }
            Err(e) => {
                self.force_transition(SessionStatus::Failed);
                warn!(error = %e, "session bootstrap failed");
                Err(e)
            }
        }
    }

    /// Tear the session down: connected -> idle
    pub fn disconnect(&self) -> Result<(), SessionError> {
        if !self.try_transition(SessionStatus::Idle) {
            return Err(SessionError::InvalidTransition {
                from: self.status(),
                to: SessionStatus::Idle,
            });
        }
        *self.session_guard() = None;
        info!("identity session disconnected");
        Ok(())
    }

    /// Return a failed session to idle without reconnecting
    pub fn reset(&self) -> Result<(), SessionError> {
        match self.status() {
            SessionStatus::Failed => {
                self.force_transition(SessionStatus::Idle);
                Ok(())
            }
            from => Err(SessionError::InvalidTransition {
                from,
                to: SessionStatus::Idle,
            }),
        }
    }

    async fn bootstrap(&self, capability: &SigningCapability) -> Result<ThreeId, SessionError> {
        let credential = AuthCredential::from_capability(capability);
        if !credential.is_consistent() {
            return Err(SessionError::InvalidCredential);
        }

        let signature = capability.sign(&credential.challenge_bytes()).await?;
        let credential = credential.with_signature(signature);

        let id = self.network.authenticate(&credential).await?;
        Ok(id)
    }

    /// Atomically apply a transition if the state machine allows it
    fn try_transition(&self, target: SessionStatus) -> bool {
        self.status_tx.send_if_modified(|status| {
            if status.can_transition_to(&target) {
                *status = target.clone();
                true
            } else {
                false
            }
        })
    }

    fn force_transition(&self, target: SessionStatus) {
        self.status_tx.send_replace(target);
    }

    fn session_guard(&self) -> MutexGuard<'_, Option<IdentitySession>> {
        match self.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
