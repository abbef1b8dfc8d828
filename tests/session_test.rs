use std::sync::Arc;
use std::time::Duration;
use threeid::identity::{SessionConfig, SessionController, SessionError, SessionStatus};
use threeid::network::MockIdentityNetwork;
use threeid::wallet::{MockWallet, SigningCapability, WalletError, WalletProvider};

async fn acquire_capability(wallet: &Arc<MockWallet>) -> SigningCapability {
    let handle = wallet.connect("goerli").await.unwrap();
    SigningCapability::new(wallet.clone(), handle)
}

/// Test: successful bootstrap lands in Connected with a stable identifier
#[tokio::test]
async fn test_successful_connect() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let network = Arc::new(MockIdentityNetwork::new());
    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let capability = acquire_capability(&wallet).await;

    let id = controller.connect(&capability).await.unwrap();

    assert_eq!(controller.status(), SessionStatus::Connected);
    assert_eq!(controller.three_id(), Some(id));
    assert_eq!(network.auth_calls(), 1);
}

/// Test: the same account always gets the same 3ID
#[tokio::test]
async fn test_same_account_same_identity() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let capability = acquire_capability(&wallet).await;

    let first = SessionController::new(Arc::new(MockIdentityNetwork::new()), SessionConfig::new())
        .connect(&capability)
        .await
        .unwrap();
    let second = SessionController::new(Arc::new(MockIdentityNetwork::new()), SessionConfig::new())
        .connect(&capability)
        .await
        .unwrap();

    assert_eq!(first, second);
}

/// Test: exactly one Connecting state per attempt; a second connect while
/// the first is in flight fails fast and never reaches the network
#[tokio::test]
async fn test_duplicate_connect_while_connecting_is_rejected() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let network = Arc::new(MockIdentityNetwork::new().with_delay_ms(200));
    let controller = Arc::new(SessionController::new(network.clone(), SessionConfig::new()));
    let capability = acquire_capability(&wallet).await;

    let background = {
        let controller = controller.clone();
        let capability = capability.clone();
        tokio::spawn(async move { controller.connect(&capability).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.status(), SessionStatus::Connecting);

    let second = controller.connect(&capability).await;
    assert!(matches!(second, Err(SessionError::AlreadyConnecting)));

    background.await.unwrap().unwrap();
    assert_eq!(controller.status(), SessionStatus::Connected);
    assert_eq!(network.auth_calls(), 1, "only one bootstrap should reach the network");
}

/// Test: connecting while already connected is rejected
#[tokio::test]
async fn test_connect_while_connected_is_rejected() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let network = Arc::new(MockIdentityNetwork::new());
    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let capability = acquire_capability(&wallet).await;

    controller.connect(&capability).await.unwrap();
    let second = controller.connect(&capability).await;

    assert!(matches!(second, Err(SessionError::AlreadyConnected)));
    assert_eq!(network.auth_calls(), 1);
}

/// Test: bootstrap exceeding the configured bound fails with Timeout
#[tokio::test]
async fn test_slow_network_times_out() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let network = Arc::new(MockIdentityNetwork::new().with_delay_ms(500));
    let config = SessionConfig::new().with_connect_timeout(Duration::from_millis(50));
    let controller = SessionController::new(network, config);
    let capability = acquire_capability(&wallet).await;

    let result = controller.connect(&capability).await;

    assert!(matches!(result, Err(SessionError::Timeout(_))));
    assert_eq!(controller.status(), SessionStatus::Failed);
    assert!(controller.three_id().is_none());
}

/// Test: rejected authentication lands in Failed, and the user can
/// re-initiate from there
#[tokio::test]
async fn test_rejected_auth_allows_reinitiation() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let network = Arc::new(MockIdentityNetwork::new().with_auth_failure("revoked"));
    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let capability = acquire_capability(&wallet).await;

    let first = controller.connect(&capability).await;
    assert!(matches!(first, Err(SessionError::Network(_))));
    assert_eq!(controller.status(), SessionStatus::Failed);

    // No automatic retry happened; an explicit second attempt is allowed
    let second = controller.connect(&capability).await;
    assert!(second.is_err());
    assert_eq!(network.auth_calls(), 2);
}

/// Test: a wallet that refuses the challenge signature fails the bootstrap
#[tokio::test]
async fn test_rejected_signature_challenge_fails_bootstrap() {
    let wallet = Arc::new(MockWallet::new("goerli").with_sign_rejected());
    let network = Arc::new(MockIdentityNetwork::new());
    let controller = SessionController::new(network.clone(), SessionConfig::new());
    let capability = acquire_capability(&wallet).await;

    let result = controller.connect(&capability).await;

    assert!(matches!(
        result,
        Err(SessionError::Wallet(WalletError::SignatureRejected))
    ));
    assert_eq!(controller.status(), SessionStatus::Failed);
    assert_eq!(network.auth_calls(), 0, "challenge failure never reaches the network");
}

/// Test: explicit disconnect returns to Idle and drops the session
#[tokio::test]
async fn test_disconnect_returns_to_idle() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let controller =
        SessionController::new(Arc::new(MockIdentityNetwork::new()), SessionConfig::new());
    let capability = acquire_capability(&wallet).await;

    controller.connect(&capability).await.unwrap();
    controller.disconnect().unwrap();

    assert_eq!(controller.status(), SessionStatus::Idle);
    assert!(controller.three_id().is_none());
}

/// Test: disconnect without a connected session is an invalid transition
#[tokio::test]
async fn test_disconnect_while_idle_is_rejected() {
    let controller =
        SessionController::new(Arc::new(MockIdentityNetwork::new()), SessionConfig::new());

    let result = controller.disconnect();

    assert!(matches!(result, Err(SessionError::InvalidTransition { .. })));
}

/// Test: subscribers observe the idle -> connecting -> connected sequence
#[tokio::test]
async fn test_subscriber_observes_transitions() {
    let wallet = Arc::new(MockWallet::new("goerli"));
    let network = Arc::new(MockIdentityNetwork::new().with_delay_ms(100));
    let controller = Arc::new(SessionController::new(network, SessionConfig::new()));
    let capability = acquire_capability(&wallet).await;

    let mut receiver = controller.subscribe();
    assert_eq!(*receiver.borrow(), SessionStatus::Idle);

    let watcher = tokio::spawn(async move {
        let mut seen = Vec::new();
        while receiver.changed().await.is_ok() {
            let status = receiver.borrow().clone();
            let done = status.is_connected();
            seen.push(status);
            if done {
                break;
            }
        }
        seen
    });

    controller.connect(&capability).await.unwrap();
    let seen = watcher.await.unwrap();

    assert_eq!(
        seen,
        vec![SessionStatus::Connecting, SessionStatus::Connected]
    );
}
