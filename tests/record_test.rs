use serde_json::json;
use std::sync::Arc;
use threeid::identity::{SessionConfig, SessionController};
use threeid::network::{MockIdentityNetwork, RecordContent};
use threeid::record::{RecordError, RecordHandle, BASIC_PROFILE};
use threeid::wallet::{MockWallet, SigningCapability, WalletProvider};

fn patch(pairs: &[(&str, serde_json::Value)]) -> RecordContent {
    let mut content = RecordContent::new();
    for (key, value) in pairs {
        content.insert(key.to_string(), value.clone());
    }
    content
}

async fn connected_fixture(
    network: Arc<MockIdentityNetwork>,
) -> (SessionController, RecordHandle) {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let handle = wallet.connect("goerli").await.unwrap();
    let capability = SigningCapability::new(wallet, handle);

    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let id = controller.connect(&capability).await.unwrap();

    let record = RecordHandle::new(network, id, BASIC_PROFILE, controller.subscribe());
    (controller, record)
}

/// Test: operations without a connected session fail before any network call
#[tokio::test]
async fn test_not_connected_produces_no_network_call() {
    let network = Arc::new(MockIdentityNetwork::new());
    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let mut record = RecordHandle::new(
        network.clone(),
        threeid::identity::ThreeId::from_digest(&[9u8; 32]),
        BASIC_PROFILE,
        controller.subscribe(),
    );

    let merge_result = record.merge(patch(&[("name", json!("X"))])).await;
    let load_result = record.load().await;

    assert!(matches!(merge_result, Err(RecordError::NotConnected)));
    assert!(matches!(load_result, Err(RecordError::NotConnected)));
    assert_eq!(network.merge_calls(), 0);
    assert_eq!(network.get_calls(), 0);
}

/// Test: a brand-new identity has no record content after the initial load
#[tokio::test]
async fn test_fresh_identity_reads_empty() {
    let network = Arc::new(MockIdentityNetwork::new());
    let (_controller, mut record) = connected_fixture(network).await;

    record.load().await.unwrap();

    assert!(record.is_loaded());
    assert!(record.read().is_none(), "no record has ever been written");
}

/// Test: merge overwrites patched keys and preserves the rest, and the
/// cache reflects the write without another read round trip
#[tokio::test]
async fn test_merge_sequence_preserves_existing_fields() {
    let network = Arc::new(MockIdentityNetwork::new());
    let (_controller, mut record) = connected_fixture(network.clone()).await;
    record.load().await.unwrap();

    record.merge(patch(&[("name", json!("Alice"))])).await.unwrap();
    assert_eq!(record.get("name"), Some(&json!("Alice")));

    record.merge(patch(&[("bio", json!("hi"))])).await.unwrap();
    assert_eq!(record.get("name"), Some(&json!("Alice")));
    assert_eq!(record.get("bio"), Some(&json!("hi")));

    assert_eq!(network.get_calls(), 1, "reads after merge come from the cache");
    assert_eq!(network.merge_calls(), 2);
}

/// Test: overwriting an existing key replaces only that key
#[tokio::test]
async fn test_merge_overwrites_patched_key() {
    let network = Arc::new(MockIdentityNetwork::new());
    let (_controller, mut record) = connected_fixture(network).await;

    record
        .merge(patch(&[("name", json!("Alice")), ("bio", json!("hi"))]))
        .await
        .unwrap();
    record.merge(patch(&[("name", json!("Bob"))])).await.unwrap();

    assert_eq!(record.get("name"), Some(&json!("Bob")));
    assert_eq!(record.get("bio"), Some(&json!("hi")));
}

/// Test: a denied write surfaces WriteRejected and leaves the cache alone
#[tokio::test]
async fn test_rejected_write_keeps_cache() {
    let network = Arc::new(MockIdentityNetwork::new().with_write_rejection("malformed schema"));
    let (_controller, mut record) = connected_fixture(network).await;
    record.load().await.unwrap();

    let result = record.merge(patch(&[("name", json!("Alice"))])).await;

    assert!(matches!(result, Err(RecordError::WriteRejected(_))));
    assert!(record.read().is_none(), "failed write must not touch the cache");
}

/// Test: a seeded record is visible after the initial load
#[tokio::test]
async fn test_seeded_record_loads() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let handle = wallet.connect("goerli").await.unwrap();
    let capability = SigningCapability::new(wallet, handle);

    // Seed under the identity the mock will assign to this account
    let seeded_id = {
        let credential = threeid::identity::AuthCredential::from_capability(&capability);
        MockIdentityNetwork::expected_id(&credential)
    };
    let network = Arc::new(
        MockIdentityNetwork::new().with_seeded_record(
            &seeded_id,
            BASIC_PROFILE,
            patch(&[("name", json!("Alice"))]),
        ),
    );

    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let id = controller.connect(&capability).await.unwrap();
    assert_eq!(id, seeded_id);

    let mut record = RecordHandle::new(network, id, BASIC_PROFILE, controller.subscribe());
    record.load().await.unwrap();

    assert_eq!(record.get("name"), Some(&json!("Alice")));
}

/// Test: disconnecting invalidates the record handle
#[tokio::test]
async fn test_disconnect_invalidates_handle() {
    let network = Arc::new(MockIdentityNetwork::new());
    let (controller, mut record) = connected_fixture(network.clone()).await;
    record.load().await.unwrap();

    controller.disconnect().unwrap();

    let result = record.merge(patch(&[("name", json!("X"))])).await;
    assert!(matches!(result, Err(RecordError::NotConnected)));
    assert_eq!(network.merge_calls(), 0);
}
