//! Error types for the wallet integration layer.

use displaydoc::Display;
use thiserror::Error;

/// Errors surfaced by the wallet connector.
#[derive(Debug, Display, Error)]
pub enum WalletError {
    /// Wallet pairing library did not become available before the deadline
    LibraryUnavailable,

    /// Timed out waiting for the wallet to complete pairing
    ConnectionTimeout,

    /// Wallet connection failed: {0}
    ConnectionFailed(String),

    /// Wallet is not connected
    NotConnected,

    /// Invalid account id '{0}' (expected shard.realm.number, e.g. 0.0.12345)
    InvalidAccountFormat(String),
}

impl WalletError {
    /// True when the failure means the wallet extension / pairing library is
    /// missing from the host environment, as opposed to a pairing that was
    /// attempted and failed. The UI renders these differently.
    pub fn is_library_missing(&self) -> bool {
        matches!(self, WalletError::LibraryUnavailable)
    }
}

impl From<PairingError> for WalletError {
    fn from(err: PairingError) -> Self {
        if err.is_not_installed() {
            WalletError::LibraryUnavailable
        } else {
            WalletError::ConnectionFailed(err.to_string())
        }
    }
}

/// Errors reported by the external wallet-pairing library boundary.
#[derive(Debug, Display, Error)]
pub enum PairingError {
    /// Wallet extension is not installed
    ExtensionNotInstalled,

    /// Pairing rejected by the wallet: {0}
    Rejected(String),

    /// Pairing library error: {0}
    Library(String),
}

impl PairingError {
    /// Classify "extension missing" failures.
    ///
    /// The structured `ExtensionNotInstalled` code is the primary signal.
    /// The substring match on "failed to load" is a compatibility shim for
    /// library builds that only report a free-form message.
    pub fn is_not_installed(&self) -> bool {
        match self {
            PairingError::ExtensionNotInstalled => true,
            PairingError::Library(message) => message.contains("failed to load"),
            PairingError::Rejected(_) => false,
        }
    }
}

/// Errors from the mirror node REST reader.
#[derive(Debug, Display, Error)]
pub enum MirrorError {
    /// Mirror node request to {path} failed with status {status}
    RequestFailed { status: u16, path: String },

    /// Mirror node transport error: {0}
    Transport(#[from] reqwest::Error),

    /// Malformed mirror node response: {0}
    Malformed(String),
}

/// Result type for connector operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Result type for mirror node reads.
pub type MirrorResult<T> = Result<T, MirrorError>;
