//! External wallet-pairing library boundary.
//!
//! The pairing protocol itself (HashConnect) is an external collaborator: in
//! the browser it arrives as a script-tag global; here it is an explicitly
//! owned object the host registers on a [`LibrarySlot`] once it has finished
//! loading. The connector only ever talks to the [`PairingLibrary`] /
//! [`PairingClient`] traits, which keeps the whole lifecycle testable with a
//! scripted double.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

use crate::error::{PairingError, WalletError};
use crate::session::{AppMetadata, Network, TransactionSigningRequest};

/// Result of library-level initialization.
#[derive(Debug, Clone)]
pub struct PairingInit {
    /// Opaque string a wallet consumes to initiate a new pairing.
    pub pairing_string: String,
}

/// A pairing the library has stored locally (or just completed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPairing {
    pub account_ids: Vec<String>,
    pub network: String,
    pub topic: String,
}

/// Events the pairing library pushes to the application.
#[derive(Debug, Clone)]
pub enum PairingEvent {
    /// The wallet browser extension announced itself.
    ExtensionFound {
        /// Wallet metadata as reported by the extension.
        metadata: serde_json::Value,
    },
    /// A pairing handshake completed.
    Paired(SavedPairing),
}

/// One constructed pairing-client instance (a HashConnect object).
#[async_trait]
pub trait PairingClient: Send + Sync {
    /// Library-level initialization; yields the pairing string.
    async fn init(&self) -> Result<PairingInit, PairingError>;

    /// Ask the locally installed wallet to begin pairing.
    async fn connect_to_local_wallet(&self, pairing_string: &str) -> Result<(), PairingError>;

    /// Tear down the channel behind a session topic.
    async fn disconnect(&self, topic: &str) -> Result<(), PairingError>;

    /// Forward a signing request over a paired channel. The result is opaque
    /// to this layer and handed back to the caller as-is.
    async fn send_transaction(
        &self,
        topic: &str,
        request: &TransactionSigningRequest,
    ) -> Result<serde_json::Value, PairingError>;

    /// Pairings the library restored from its local storage.
    fn saved_pairings(&self) -> Vec<SavedPairing>;

    /// Subscribe to pairing events.
    fn subscribe(&self) -> broadcast::Receiver<PairingEvent>;
}

/// Factory for pairing clients (the library object itself).
pub trait PairingLibrary: Send + Sync {
    /// Construct a client configured for one application.
    fn create(
        &self,
        debug: bool,
        network: Network,
        app_metadata: AppMetadata,
        return_transaction: bool,
    ) -> Arc<dyn PairingClient>;
}

/// Registration point for the pairing library.
///
/// The host registers the library when it becomes available; until then the
/// connector polls the slot at a fixed interval, bounded by a deadline.
/// Cloning yields another handle to the same slot.
#[derive(Clone, Default)]
pub struct LibrarySlot {
    inner: Arc<RwLock<Option<Arc<dyn PairingLibrary>>>>,
}

impl LibrarySlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the pairing library available to waiters.
    pub fn register(&self, library: Arc<dyn PairingLibrary>) {
        *self.inner.write().unwrap() = Some(library);
    }

    /// Non-blocking probe.
    pub fn get(&self) -> Option<Arc<dyn PairingLibrary>> {
        self.inner.read().unwrap().clone()
    }

    /// Poll until the library is registered or the deadline elapses.
    pub async fn wait_ready(
        &self,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Arc<dyn PairingLibrary>, WalletError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(library) = self.get() {
                return Ok(library);
            }
            if Instant::now() >= deadline {
                return Err(WalletError::LibraryUnavailable);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullLibrary;

    impl PairingLibrary for NullLibrary {
        fn create(
            &self,
            _debug: bool,
            _network: Network,
            _app_metadata: AppMetadata,
            _return_transaction: bool,
        ) -> Arc<dyn PairingClient> {
            unimplemented!("not constructed in these tests")
        }
    }

    #[tokio::test]
    async fn test_wait_ready_times_out_on_empty_slot() {
        let slot = LibrarySlot::new();
        let err = slot
            .wait_ready(Duration::from_millis(5), Duration::from_millis(30))
            .await
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, WalletError::LibraryUnavailable));
    }

    #[tokio::test]
    async fn test_wait_ready_sees_late_registration() {
        let slot = LibrarySlot::new();
        let registrar = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            registrar.register(Arc::new(NullLibrary));
        });

        slot.wait_ready(Duration::from_millis(5), Duration::from_secs(1))
            .await
            .map(|_| ())
            .unwrap();
    }

    #[test]
    fn test_saved_pairing_wire_shape() {
        let json = r#"{"accountIds":["0.0.5005"],"network":"testnet","topic":"abc123"}"#;
        let pairing: SavedPairing = serde_json::from_str(json).unwrap();
        assert_eq!(pairing.account_ids, vec!["0.0.5005"]);
        assert_eq!(pairing.topic, "abc123");
    }
}
