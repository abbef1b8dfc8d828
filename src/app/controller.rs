// Application controller - the generalized "page"
// Owns the wallet modal, the session controller, and (while connected) the
// profile record handle. Single-flight connects are enforced by the session
// controller's status guard; this layer adds no guard of its own.

use crate::identity::{SessionConfig, SessionController, SessionError, SessionStatus, ThreeId};
use crate::network::{IdentityNetwork, RecordContent};
use crate::record::{RecordError, RecordHandle, BASIC_PROFILE};
use crate::wallet::{ModalConfig, WalletError, WalletModal, WalletProvider};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

/// Errors surfaced to the view layer
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

/// Top-level application controller.
///
/// The modal is an owned resource of this controller, passed into the
/// acquisition flow explicitly; nothing lives in ambient global state.
pub struct App {
    modal: WalletModal,
    session: SessionController,
    network: Arc<dyn IdentityNetwork>,
    record: Option<RecordHandle>,
}

impl App {
    /// Wire the controller to its two external collaborators
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        network: Arc<dyn IdentityNetwork>,
        modal_config: ModalConfig,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            modal: WalletModal::new(modal_config, provider),
            session: SessionController::new(network.clone(), session_config),
            network,
            record: None,
        }
    }

    /// Current session status
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    /// Subscribe to session status transitions (for view re-render)
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.session.subscribe()
    }

    /// The session identifier, once connected
    pub fn three_id(&self) -> Option<ThreeId> {
        self.session.three_id()
    }

    /// The profile record handle, once connected
    pub fn record(&self) -> Option<&RecordHandle> {
        self.record.as_ref()
    }

    /// Full connect flow: acquire a signer, bootstrap the session, then
    /// lazily load the profile record.
    ///
    /// If the user dismisses the wallet modal the session stays idle and no
    /// bootstrap attempt is made. A failed initial record load leaves the
    /// session connected; the error still surfaces to the caller.
    ///
    /// Duplicate attempts fail fast: the session controller applies the
    /// idle/failed -> connecting transition atomically, so a bootstrap that
    /// is already in flight (or an established session) rejects this call
    /// before anything reaches the network.
    pub async fn connect(&mut self) -> Result<ThreeId, AppError> {
        let capability = self.modal.acquire().await?;
        let id = self.session.connect(&capability).await?;

        let mut record = RecordHandle::new(
            self.network.clone(),
            id.clone(),
            BASIC_PROFILE,
            self.session.subscribe(),
        );
        let loaded = record.load().await;
        self.record = Some(record);
        loaded?;

        Ok(id)
    }

    /// Tear the session down and release the wallet capability
    pub fn disconnect(&mut self) -> Result<(), AppError> {
        self.session.disconnect()?;
        self.modal.release();
        self.record = None;
        Ok(())
    }

    /// Update the profile's name field
    pub async fn set_profile_name(&mut self, name: &str) -> Result<(), AppError> {
        let record = self
            .record
            .as_mut()
            .ok_or(AppError::Record(RecordError::NotConnected))?;

        let mut patch = RecordContent::new();
        patch.insert("name".to_string(), Value::String(name.to_string()));
        record.merge(patch).await?;
        Ok(())
    }

    /// The profile's name field, if set
    pub fn profile_name(&self) -> Option<&str> {
        self.record.as_ref()?.get("name")?.as_str()
    }

    /// Connection status rendered the way the page's status label shows it
    pub fn status_line(&self) -> String {
        match self.session.status() {
            SessionStatus::Connected => match self.session.three_id() {
                Some(id) => format!("Your 3ID is {}", id),
                None => {
                    warn!("connected session without an identifier");
                    "Connected".to_string()
                }
            },
            SessionStatus::Connecting => "Connecting...".to_string(),
            SessionStatus::Failed => "Connection failed. Try connecting again.".to_string(),
            SessionStatus::Idle => "Connect with your wallet to access your 3ID".to_string(),
        }
    }

    /// Profile greeting rendered the way the page shows it
    pub fn profile_line(&self) -> String {
        match self.profile_name() {
            Some(name) => format!("Hello {}!", name),
            None => "You do not have a profile record attached to your 3ID. \
                     Create a basic profile by setting a name."
                .to_string(),
        }
    }
}
