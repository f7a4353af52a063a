//! Wallet connection manager.
//!
//! Owns the application's single [`WalletSession`] and mediates every
//! interaction with the external pairing library: bounded-poll availability
//! wait, one-time event handling, pairing, teardown, and signing-request
//! forwarding. All other components observe the session through the
//! synchronous read operations or through subscription callbacks; nothing
//! else mutates it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::{WalletError, WalletResult};
use crate::pairing::{LibrarySlot, PairingClient, PairingEvent, SavedPairing};
use crate::session::{
    AccountId, AppMetadata, Network, TransactionSigningRequest, WalletSession,
};

/// Connector configuration. Defaults reproduce the production behavior;
/// tests shrink the timeouts.
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Target network, also fixed into manually entered sessions.
    pub network: Network,
    /// Application identity shown by the wallet during pairing.
    pub app_metadata: AppMetadata,
    /// Ask the library for verbose logging.
    pub debug: bool,
    /// Ask the wallet to hand the signed transaction back instead of
    /// submitting it itself.
    pub return_transaction: bool,
    /// Interval between availability probes of the pairing library.
    pub library_poll_interval: Duration,
    /// Overall deadline for the library to become available.
    pub library_load_timeout: Duration,
    /// Deadline for a pairing to complete after it was requested.
    pub pairing_timeout: Duration,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            app_metadata: AppMetadata::default(),
            debug: true,
            return_transaction: false,
            library_poll_interval: Duration::from_millis(100),
            library_load_timeout: Duration::from_secs(10),
            pairing_timeout: Duration::from_secs(60),
        }
    }
}

type SessionCallback = Box<dyn Fn(Option<&WalletSession>) + Send + Sync>;

struct InitState {
    client: Option<Arc<dyn PairingClient>>,
    pairing_string: String,
}

struct ConnectorInner {
    config: ConnectorConfig,
    library: LibrarySlot,
    init: Mutex<InitState>,
    /// Current session; the watch channel doubles as the synchronous read
    /// path and as the wake-up for `connect()` waiters.
    session_tx: watch::Sender<Option<WalletSession>>,
    subscribers: StdMutex<Vec<(u64, SessionCallback)>>,
    next_subscriber_id: AtomicU64,
    /// Pairing events are handled at most once per manager lifetime.
    pairing_handled: AtomicBool,
}

impl ConnectorInner {
    /// Replace the current session and notify subscribers in insertion
    /// order. Callbacks run synchronously and must not re-enter the
    /// connector.
    fn publish(&self, session: Option<WalletSession>) {
        self.session_tx.send_replace(session.clone());
        let subscribers = self.subscribers.lock().unwrap();
        for (_, callback) in subscribers.iter() {
            callback(session.as_ref());
        }
    }

    /// Adopt a pairing reported by the library as the current session.
    /// The most recent pairing wins.
    fn adopt_pairing(&self, pairing: SavedPairing) {
        let mut account_ids = Vec::with_capacity(pairing.account_ids.len());
        for raw in &pairing.account_ids {
            match raw.parse::<AccountId>() {
                Ok(id) => account_ids.push(id),
                Err(_) => {
                    warn!("ignoring pairing with malformed account id '{raw}'");
                    return;
                }
            }
        }

        let network = match pairing.network.parse::<Network>() {
            Ok(network) => network,
            Err(err) => {
                warn!("ignoring pairing: {err}");
                return;
            }
        };

        match WalletSession::new(account_ids, network, pairing.topic) {
            Some(session) => {
                info!(
                    account = %session.primary_account(),
                    network = %session.network,
                    "wallet paired"
                );
                self.publish(Some(session));
            }
            None => warn!("ignoring pairing with no accounts"),
        }
    }
}

/// Process-wide wallet connection manager.
///
/// Construct one at application start and clone the handle wherever wallet
/// access is needed; clones share all state.
#[derive(Clone)]
pub struct WalletConnector {
    inner: Arc<ConnectorInner>,
}

impl WalletConnector {
    /// Create a connector that waits for the pairing library on `library`.
    pub fn new(config: ConnectorConfig, library: LibrarySlot) -> Self {
        let (session_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(ConnectorInner {
                config,
                library,
                init: Mutex::new(InitState {
                    client: None,
                    pairing_string: String::new(),
                }),
                session_tx,
                subscribers: StdMutex::new(Vec::new()),
                next_subscriber_id: AtomicU64::new(0),
                pairing_handled: AtomicBool::new(false),
            }),
        }
    }

    /// Idempotent setup: wait for the pairing library, construct one client,
    /// register event handling, run library initialization, and adopt a
    /// previously saved pairing if the library has one.
    ///
    /// Fails with [`WalletError::LibraryUnavailable`] if the library never
    /// appears before the configured deadline; no client is constructed in
    /// that case and the call may be retried.
    pub async fn initialize(&self) -> WalletResult<()> {
        self.ensure_initialized().await.map(|_| ())
    }

    async fn ensure_initialized(&self) -> WalletResult<(Arc<dyn PairingClient>, String)> {
        let config = &self.inner.config;
        let mut init = self.inner.init.lock().await;
        if let Some(client) = &init.client {
            return Ok((client.clone(), init.pairing_string.clone()));
        }

        let library = self
            .inner
            .library
            .wait_ready(config.library_poll_interval, config.library_load_timeout)
            .await?;

        let client = library.create(
            config.debug,
            config.network,
            config.app_metadata.clone(),
            config.return_transaction,
        );

        // Events must be watched before init(), or a fast extension could
        // pair before the pump is listening.
        self.spawn_event_pump(client.subscribe());

        let init_data = client.init().await?;
        debug!("pairing library initialized");
        init.pairing_string = init_data.pairing_string;

        if let Some(saved) = client.saved_pairings().into_iter().next() {
            debug!("adopting saved pairing");
            self.inner.adopt_pairing(saved);
        }

        init.client = Some(client.clone());
        Ok((client, init.pairing_string.clone()))
    }

    fn spawn_event_pump(&self, mut events: broadcast::Receiver<PairingEvent>) {
        let weak: Weak<ConnectorInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut extension_seen = false;
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("pairing event pump lagged, skipped {skipped} events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(inner) = weak.upgrade() else { break };
                match event {
                    PairingEvent::ExtensionFound { metadata } => {
                        if !extension_seen {
                            extension_seen = true;
                            info!("wallet extension found: {metadata}");
                        }
                    }
                    PairingEvent::Paired(pairing) => {
                        if inner.pairing_handled.swap(true, Ordering::SeqCst) {
                            continue;
                        }
                        inner.adopt_pairing(pairing);
                    }
                }
            }
        });
    }

    /// Connect to the wallet.
    ///
    /// Returns the current session when one already exists (including one
    /// adopted from the library's saved pairings during initialization).
    /// Otherwise requests a new pairing and waits for a session to be
    /// published, bounded by the configured pairing timeout.
    ///
    /// Concurrent callers are not deduplicated: each independently awaits
    /// the next published session, and a single successful pairing satisfies
    /// all of them.
    pub async fn connect(&self) -> WalletResult<WalletSession> {
        if let Some(session) = self.current_session() {
            return Ok(session);
        }

        let (client, pairing_string) = self.ensure_initialized().await?;

        if let Some(session) = self.current_session() {
            return Ok(session);
        }

        // Subscribe before triggering pairing so the completion cannot race
        // past us.
        let mut session_rx = self.inner.session_tx.subscribe();
        client.connect_to_local_wallet(&pairing_string).await?;

        let wait_for_session = async {
            loop {
                if let Some(session) = session_rx.borrow_and_update().clone() {
                    return Ok(session);
                }
                if session_rx.changed().await.is_err() {
                    return Err(WalletError::ConnectionTimeout);
                }
            }
        };

        match tokio::time::timeout(self.inner.config.pairing_timeout, wait_for_session).await {
            Ok(result) => result,
            Err(_) => Err(WalletError::ConnectionTimeout),
        }
    }

    /// Publish a view-only session for a manually entered account id.
    ///
    /// Validates the id, fixes the network to testnet and the topic to the
    /// manual sentinel, and notifies subscribers. Never touches the pairing
    /// library; on a validation failure the current session is unchanged.
    pub fn connect_view_only(&self, account_id: &str) -> WalletResult<WalletSession> {
        let account_id: AccountId = account_id.parse()?;
        let session = WalletSession::view_only(account_id);
        info!(account = %session.primary_account(), "view-only session entered");
        self.inner.publish(Some(session.clone()));
        Ok(session)
    }

    /// Disconnect the current session, if any.
    ///
    /// Tears down the pairing channel for real sessions (teardown failures
    /// are logged, never surfaced), clears the session, and notifies
    /// subscribers. Silently does nothing when no session exists.
    pub async fn disconnect(&self) {
        let Some(session) = self.current_session() else {
            return;
        };

        if !session.is_view_only() {
            let client = self.inner.init.lock().await.client.clone();
            if let Some(client) = client {
                if let Err(err) = client.disconnect(&session.topic).await {
                    warn!("wallet channel teardown failed: {err}");
                }
            }
        }

        info!("wallet disconnected");
        self.inner.publish(None);
    }

    /// Register a callback for session changes; callbacks are invoked in
    /// insertion order. The returned [`Subscription`] removes exactly this
    /// registration.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Option<&WalletSession>) + Send + Sync + 'static,
    {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .push((id, Box::new(callback)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Current session, if any. Never blocks.
    pub fn current_session(&self) -> Option<WalletSession> {
        self.inner.session_tx.borrow().clone()
    }

    /// The primary (signing) account of the current session. Never blocks.
    pub fn primary_account(&self) -> Option<AccountId> {
        self.inner
            .session_tx
            .borrow()
            .as_ref()
            .map(|session| session.primary_account().clone())
    }

    /// True when a session (paired or view-only) exists. Never blocks.
    pub fn is_connected(&self) -> bool {
        self.inner.session_tx.borrow().is_some()
    }

    /// Forward transaction bytes to the wallet for signing.
    ///
    /// Fails with [`WalletError::NotConnected`] when no session exists, or
    /// when the session is view-only (a sentinel topic has no pairing
    /// channel); the library is not contacted in either case. On success the
    /// library's result is returned opaquely.
    pub async fn send_transaction(&self, payload: Vec<u8>) -> WalletResult<serde_json::Value> {
        let session = self.current_session().ok_or(WalletError::NotConnected)?;
        if session.is_view_only() {
            return Err(WalletError::NotConnected);
        }

        let client = self
            .inner
            .init
            .lock()
            .await
            .client
            .clone()
            .ok_or(WalletError::NotConnected)?;

        let request = TransactionSigningRequest::for_session(
            &session,
            payload,
            self.inner.config.return_transaction,
        );
        debug!(account = %request.metadata.account_to_sign, "forwarding signing request");
        Ok(client.send_transaction(&session.topic, &request).await?)
    }
}

/// Capability returned by [`WalletConnector::subscribe`].
pub struct Subscription {
    id: u64,
    inner: Weak<ConnectorInner>,
}

impl Subscription {
    /// Remove this registration; the callback receives no further
    /// notifications.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner
                .subscribers
                .lock()
                .unwrap()
                .retain(|(id, _)| *id != self.id);
        }
    }
}
