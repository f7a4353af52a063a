//! Integration tests for fractio-wallet
//!
//! These tests drive the full wallet-connection lifecycle against a scripted
//! pairing library:
//! - Library availability polling and timeout
//! - Pairing (saved and event-driven), disconnect, reconnect
//! - Subscription notifications
//! - View-only (manual entry) sessions
//! - Transaction signing request forwarding

use async_trait::async_trait;
use fractio_wallet::error::{PairingError, WalletError};
use fractio_wallet::pairing::{
    LibrarySlot, PairingClient, PairingEvent, PairingInit, PairingLibrary, SavedPairing,
};
use fractio_wallet::session::{AppMetadata, Network, TransactionSigningRequest};
use fractio_wallet::{ConnectorConfig, WalletConnector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Scripted pairing library
// ============================================================================

/// What the scripted client does when pairing is requested.
#[derive(Clone)]
enum OnConnect {
    /// Emit a pairing event for this pairing.
    Pair(SavedPairing),
    /// Fail with this error.
    Reject(Arc<PairingError>),
    /// Accept the request and then stay silent.
    Ignore,
}

struct ScriptedClient {
    calls: Mutex<Vec<String>>,
    saved: Vec<SavedPairing>,
    on_connect: OnConnect,
    events: broadcast::Sender<PairingEvent>,
}

impl ScriptedClient {
    fn new(saved: Vec<SavedPairing>, on_connect: OnConnect) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            saved,
            on_connect,
            events,
        })
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn emit(&self, event: PairingEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl PairingClient for ScriptedClient {
    async fn init(&self) -> Result<PairingInit, PairingError> {
        self.record("init");
        Ok(PairingInit {
            pairing_string: "pairing-string".to_string(),
        })
    }

    async fn connect_to_local_wallet(&self, pairing_string: &str) -> Result<(), PairingError> {
        self.record(format!("connect:{pairing_string}"));
        match &self.on_connect {
            OnConnect::Pair(pairing) => {
                self.emit(PairingEvent::Paired(pairing.clone()));
                Ok(())
            }
            OnConnect::Reject(err) => Err(clone_error(err)),
            OnConnect::Ignore => Ok(()),
        }
    }

    async fn disconnect(&self, topic: &str) -> Result<(), PairingError> {
        self.record(format!("disconnect:{topic}"));
        Ok(())
    }

    async fn send_transaction(
        &self,
        topic: &str,
        request: &TransactionSigningRequest,
    ) -> Result<serde_json::Value, PairingError> {
        self.record(format!("send:{topic}"));
        Ok(serde_json::json!({
            "success": true,
            "request": serde_json::to_value(request).unwrap(),
        }))
    }

    fn saved_pairings(&self) -> Vec<SavedPairing> {
        self.saved.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<PairingEvent> {
        self.events.subscribe()
    }
}

fn clone_error(err: &PairingError) -> PairingError {
    match err {
        PairingError::ExtensionNotInstalled => PairingError::ExtensionNotInstalled,
        PairingError::Rejected(reason) => PairingError::Rejected(reason.clone()),
        PairingError::Library(message) => PairingError::Library(message.clone()),
    }
}

struct ScriptedLibrary {
    client: Arc<ScriptedClient>,
    created: AtomicUsize,
}

impl ScriptedLibrary {
    fn new(client: Arc<ScriptedClient>) -> Arc<Self> {
        Arc::new(Self {
            client,
            created: AtomicUsize::new(0),
        })
    }
}

impl PairingLibrary for ScriptedLibrary {
    fn create(
        &self,
        _debug: bool,
        _network: Network,
        _app_metadata: AppMetadata,
        _return_transaction: bool,
    ) -> Arc<dyn PairingClient> {
        self.created.fetch_add(1, Ordering::SeqCst);
        self.client.clone()
    }
}

fn test_config() -> ConnectorConfig {
    ConnectorConfig {
        library_poll_interval: Duration::from_millis(5),
        library_load_timeout: Duration::from_millis(100),
        pairing_timeout: Duration::from_millis(500),
        ..ConnectorConfig::default()
    }
}

fn pairing(account: &str, topic: &str) -> SavedPairing {
    SavedPairing {
        account_ids: vec![account.to_string()],
        network: "testnet".to_string(),
        topic: topic.to_string(),
    }
}

fn connector_with(client: Arc<ScriptedClient>) -> (WalletConnector, Arc<ScriptedLibrary>) {
    let library = ScriptedLibrary::new(client);
    let slot = LibrarySlot::new();
    slot.register(library.clone());
    (WalletConnector::new(test_config(), slot), library)
}

fn counting_subscriber(connector: &WalletConnector) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    // The unsubscribe capability is discarded; the callback stays registered.
    let _ = connector.subscribe(move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    count
}

// ============================================================================
// Library availability
// ============================================================================

mod library_availability {
    use super::*;

    #[tokio::test]
    async fn test_initialize_fails_when_library_never_loads() {
        let connector = WalletConnector::new(test_config(), LibrarySlot::new());

        let err = connector.initialize().await.unwrap_err();
        assert!(matches!(err, WalletError::LibraryUnavailable));
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_initialize_constructs_exactly_one_client() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, library) = connector_with(client.clone());

        connector.initialize().await.unwrap();
        connector.initialize().await.unwrap();

        assert_eq!(library.created.load(Ordering::SeqCst), 1);
        assert_eq!(client.calls(), vec!["init"]);
    }

    #[tokio::test]
    async fn test_initialize_picks_up_late_library_registration() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let library = ScriptedLibrary::new(client);
        let slot = LibrarySlot::new();
        let connector = WalletConnector::new(test_config(), slot.clone());

        let registrar = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            registrar.register(library);
        });

        connector.initialize().await.unwrap();
    }
}

// ============================================================================
// Pairing lifecycle
// ============================================================================

mod pairing_lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_saved_pairing_adopted_on_connect() {
        let client = ScriptedClient::new(
            vec![pairing("0.0.5005", "abc123")],
            OnConnect::Ignore,
        );
        let (connector, _) = connector_with(client.clone());
        let notifications = counting_subscriber(&connector);

        let session = connector.connect().await.unwrap();

        assert_eq!(session.primary_account().as_str(), "0.0.5005");
        assert_eq!(session.network, Network::Testnet);
        assert_eq!(session.topic, "abc123");
        assert!(connector.is_connected());
        assert_eq!(connector.primary_account().unwrap().as_str(), "0.0.5005");
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        // Saved pairing satisfied the connect; pairing was never requested.
        assert_eq!(client.calls(), vec!["init"]);
    }

    #[tokio::test]
    async fn test_event_driven_pairing() {
        let client = ScriptedClient::new(vec![], OnConnect::Pair(pairing("0.0.777", "topic-1")));
        let (connector, _) = connector_with(client.clone());

        let session = connector.connect().await.unwrap();

        assert_eq!(session.primary_account().as_str(), "0.0.777");
        assert_eq!(session.topic, "topic-1");
        assert_eq!(client.calls(), vec!["init", "connect:pairing-string"]);
    }

    #[tokio::test]
    async fn test_connect_returns_existing_session_without_repairing() {
        let client = ScriptedClient::new(vec![], OnConnect::Pair(pairing("0.0.777", "topic-1")));
        let (connector, _) = connector_with(client.clone());

        let first = connector.connect().await.unwrap();
        let second = connector.connect().await.unwrap();

        assert_eq!(first, second);
        // A second pairing round trip never happened.
        assert_eq!(client.calls(), vec!["init", "connect:pairing-string"]);
    }

    #[tokio::test]
    async fn test_concurrent_connects_share_one_pairing() {
        let client = ScriptedClient::new(vec![], OnConnect::Pair(pairing("0.0.777", "topic-1")));
        let (connector, _) = connector_with(client);

        let a = connector.clone();
        let b = connector.clone();
        let (first, second) = tokio::join!(a.connect(), b.connect());

        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[tokio::test]
    async fn test_connect_times_out_without_pairing() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, _) = connector_with(client);

        let err = connector.connect().await.unwrap_err();
        assert!(matches!(err, WalletError::ConnectionTimeout));
        assert!(!connector.is_connected());
    }

    #[tokio::test]
    async fn test_explicit_rejection_maps_to_connection_failed() {
        let client = ScriptedClient::new(
            vec![],
            OnConnect::Reject(Arc::new(PairingError::Rejected("user declined".into()))),
        );
        let (connector, _) = connector_with(client);

        let err = connector.connect().await.unwrap_err();
        assert!(matches!(err, WalletError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_load_failure_message_classified_as_library_missing() {
        let client = ScriptedClient::new(
            vec![],
            OnConnect::Reject(Arc::new(PairingError::Library(
                "HashConnect library failed to load".into(),
            ))),
        );
        let (connector, _) = connector_with(client);

        let err = connector.connect().await.unwrap_err();
        assert!(err.is_library_missing());
    }

    #[tokio::test]
    async fn test_pairing_event_handled_at_most_once() {
        let client = ScriptedClient::new(vec![], OnConnect::Pair(pairing("0.0.111", "topic-1")));
        let (connector, _) = connector_with(client.clone());

        connector.connect().await.unwrap();

        // A second pairing event must not replace the adopted session.
        client.emit(PairingEvent::Paired(pairing("0.0.222", "topic-2")));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(connector.primary_account().unwrap().as_str(), "0.0.111");
    }

    #[tokio::test]
    async fn test_disconnect_tears_down_topic_and_notifies_once() {
        let client = ScriptedClient::new(
            vec![pairing("0.0.5005", "abc123")],
            OnConnect::Ignore,
        );
        let (connector, _) = connector_with(client.clone());

        connector.connect().await.unwrap();
        let notifications = counting_subscriber(&connector);

        connector.disconnect().await;

        assert!(!connector.is_connected());
        assert!(connector.current_session().is_none());
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
        assert!(client.calls().contains(&"disconnect:abc123".to_string()));
    }

    #[tokio::test]
    async fn test_disconnect_without_session_is_a_no_op() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, _) = connector_with(client.clone());
        let notifications = counting_subscriber(&connector);

        connector.disconnect().await;

        assert_eq!(notifications.load(Ordering::SeqCst), 0);
        assert!(client.calls().is_empty());
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

mod subscriptions {
    use super::*;

    #[tokio::test]
    async fn test_unsubscribed_callback_receives_nothing_further() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, _) = connector_with(client);

        let removed = Arc::new(AtomicUsize::new(0));
        let kept = Arc::new(AtomicUsize::new(0));

        let removed_seen = removed.clone();
        let subscription = connector.subscribe(move |_| {
            removed_seen.fetch_add(1, Ordering::SeqCst);
        });
        let kept_seen = kept.clone();
        let _ = connector.subscribe(move |_| {
            kept_seen.fetch_add(1, Ordering::SeqCst);
        });

        connector.connect_view_only("0.0.1").unwrap();
        subscription.unsubscribe();
        connector.connect_view_only("0.0.2").unwrap();
        connector.disconnect().await;

        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert_eq!(kept.load(Ordering::SeqCst), 3);
    }
}

// ============================================================================
// View-only sessions
// ============================================================================

mod view_only {
    use super::*;

    #[tokio::test]
    async fn test_manual_entry_never_touches_the_library() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, library) = connector_with(client.clone());

        let session = connector.connect_view_only("0.0.12345").unwrap();

        assert_eq!(session.account_ids.len(), 1);
        assert_eq!(session.primary_account().as_str(), "0.0.12345");
        assert_eq!(session.network, Network::Testnet);
        assert!(session.is_view_only());
        assert_eq!(library.created.load(Ordering::SeqCst), 0);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_manual_entry_leaves_state_unchanged() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, _) = connector_with(client);

        connector.connect_view_only("0.0.42").unwrap();

        for input in ["", "abc", "0.0.x", "1.2.3", "0.0.1.2"] {
            let err = connector.connect_view_only(input).unwrap_err();
            assert!(matches!(err, WalletError::InvalidAccountFormat(_)));
        }

        assert_eq!(connector.primary_account().unwrap().as_str(), "0.0.42");
    }
}

// ============================================================================
// Transaction signing
// ============================================================================

mod signing {
    use super::*;

    #[tokio::test]
    async fn test_send_transaction_requires_connection() {
        let client = ScriptedClient::new(vec![], OnConnect::Ignore);
        let (connector, _) = connector_with(client.clone());

        let err = connector.send_transaction(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, WalletError::NotConnected));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_transaction_forwards_to_primary_account() {
        let client = ScriptedClient::new(
            vec![pairing("0.0.5005", "abc123")],
            OnConnect::Ignore,
        );
        let (connector, _) = connector_with(client.clone());

        connector.connect().await.unwrap();
        let result = connector.send_transaction(vec![10, 20, 30]).await.unwrap();

        assert_eq!(result["success"], true);
        assert_eq!(result["request"]["topic"], "abc123");
        assert_eq!(result["request"]["metadata"]["accountToSign"], "0.0.5005");
        assert_eq!(result["request"]["metadata"]["returnTransaction"], false);
        assert_eq!(result["request"]["byteArray"], serde_json::json!([10, 20, 30]));
        assert!(client.calls().contains(&"send:abc123".to_string()));
    }
}
