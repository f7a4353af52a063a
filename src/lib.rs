//! FractioNFT Wallet Integration
//!
//! Client layer connecting the FractioNFT application to a HashPack-style
//! wallet and to the Hedera mirror node REST index.
//!
//! ## Trust Model
//!
//! - Transaction construction and signing are delegated entirely to the
//!   external wallet; no key material exists in this layer
//! - The mirror node is a read-only, eventually-consistent index
//! - The pairing library is an external collaborator behind the
//!   [`pairing::PairingLibrary`] seam, registered by the host at runtime

pub mod connector;
pub mod error;
pub mod mirror;
pub mod pairing;
pub mod session;

pub mod commands;

pub use connector::{ConnectorConfig, Subscription, WalletConnector};
pub use error::{MirrorError, PairingError, WalletError};
pub use mirror::MirrorClient;
pub use pairing::{LibrarySlot, PairingClient, PairingLibrary};
pub use session::{AccountId, AppMetadata, Network, WalletSession, MANUAL_TOPIC};
