// Mock identity network for tests and the demo binary

use crate::identity::{AuthCredential, ThreeId};
use crate::network::{IdentityNetwork, NetworkError, RecordContent};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

type RecordKey = (ThreeId, String);

/// Mock implementation of IdentityNetwork with an in-memory record store.
///
/// Derives the 3ID deterministically from the authenticating address, so
/// the same account always lands on the same identity. Per-method call
/// counters let tests assert that an operation never reached the network.
pub struct MockIdentityNetwork {
    records: Mutex<HashMap<RecordKey, RecordContent>>,
    auth_failure: Option<String>,
    write_rejection: Option<String>,
    delay_ms: u64,
    auth_calls: AtomicUsize,
    get_calls: AtomicUsize,
    merge_calls: AtomicUsize,
}

impl MockIdentityNetwork {
    /// Create a mock network with no records and no configured failures
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            auth_failure: None,
            write_rejection: None,
            delay_ms: 0,
            auth_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            merge_calls: AtomicUsize::new(0),
        }
    }

    /// Reject all authentication attempts with a message
    pub fn with_auth_failure(mut self, message: &str) -> Self {
        self.auth_failure = Some(message.to_string());
        self
    }

    /// Reject all writes with a message
    pub fn with_write_rejection(mut self, message: &str) -> Self {
        self.write_rejection = Some(message.to_string());
        self
    }

    /// Add a delay before responding to any call
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Seed a record before any client interaction
    pub fn with_seeded_record(self, id: &ThreeId, name: &str, content: RecordContent) -> Self {
        self.records_guard()
            .insert((id.clone(), name.to_string()), content);
        self
    }

    /// Number of authentication calls so far
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    /// Number of record reads so far
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    /// Number of merge writes so far
    pub fn merge_calls(&self) -> usize {
        self.merge_calls.load(Ordering::SeqCst)
    }

    /// The 3ID this mock assigns to a credential's address
    pub fn expected_id(credential: &AuthCredential) -> ThreeId {
        let digest = Sha256::digest(credential.address().as_bytes());
        ThreeId::from_digest(&digest)
    }

    async fn pause(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn records_guard(&self) -> MutexGuard<'_, HashMap<RecordKey, RecordContent>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MockIdentityNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityNetwork for MockIdentityNetwork {
    async fn authenticate(&self, credential: &AuthCredential) -> Result<ThreeId, NetworkError> {
        self.pause().await;
        self.auth_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.auth_failure {
            return Err(NetworkError::AuthRejected(message.clone()));
        }
        if !credential.is_signed() {
            return Err(NetworkError::AuthRejected(
                "missing challenge signature".into(),
            ));
        }

        Ok(Self::expected_id(credential))
    }

    async fn get_record(
        &self,
        id: &ThreeId,
        name: &str,
    ) -> Result<Option<RecordContent>, NetworkError> {
        self.pause().await;
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        let records = self.records_guard();
        Ok(records.get(&(id.clone(), name.to_string())).cloned())
    }

    async fn merge_record(
        &self,
        id: &ThreeId,
        name: &str,
        patch: RecordContent,
    ) -> Result<RecordContent, NetworkError> {
        self.pause().await;
        self.merge_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.write_rejection {
            return Err(NetworkError::WriteRejected(message.clone()));
        }

        let mut records = self.records_guard();
        let content = records
            .entry((id.clone(), name.to_string()))
            .or_insert_with(RecordContent::new);
        for (key, value) in patch {
            content.insert(key, value);
        }
        Ok(content.clone())
    }
}
