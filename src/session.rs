//! Session and account types shared across the wallet integration layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WalletError;

/// Sentinel topic marking a manually-entered, view-only session.
///
/// A session carrying this topic has no pairing channel behind it and cannot
/// sign transactions.
pub const MANUAL_TOPIC: &str = "manual";

/// A Hedera entity id in `shard.realm.number` form.
///
/// Every currently deployed Hedera network uses shard 0, realm 0, so parsing
/// accepts exactly `0.0.<digits>` and rejects everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// The canonical string form (`0.0.12345`).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('.');
        let shard = parts.next();
        let realm = parts.next();
        let num = parts.next();

        let valid = parts.next().is_none()
            && shard == Some("0")
            && realm == Some("0")
            && num.is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));

        if valid {
            Ok(AccountId(s.to_string()))
        } else {
            Err(WalletError::InvalidAccountFormat(s.to_string()))
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target ledger network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Base URL of the mirror node REST index for this network.
    pub fn mirror_base_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://testnet.mirrornode.hedera.com/api/v1",
            Network::Mainnet => "https://mainnet.mirrornode.hedera.com/api/v1",
        }
    }

    /// Network name as the wallet library expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}

/// Application identity presented to the wallet during pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub icon: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "FractioNFT".to_string(),
            description: "Fractionalize your NFTs on Hedera".to_string(),
            icon: "/gem.png".to_string(),
        }
    }
}

/// An established (or manually entered) pairing with a wallet.
///
/// A session is always fully populated; "no session" is represented as
/// `None` at the connector level, never as a partially filled value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSession {
    /// Paired account ids, first entry is the primary signer. Never empty.
    pub account_ids: Vec<AccountId>,
    /// Network the pairing targets.
    pub network: Network,
    /// Channel id routing signing requests, or [`MANUAL_TOPIC`].
    pub topic: String,
}

impl WalletSession {
    /// Build a session, rejecting an empty account list.
    pub fn new(account_ids: Vec<AccountId>, network: Network, topic: String) -> Option<Self> {
        if account_ids.is_empty() {
            return None;
        }
        Some(Self {
            account_ids,
            network,
            topic,
        })
    }

    /// Build a view-only session for a manually entered account.
    pub fn view_only(account_id: AccountId) -> Self {
        Self {
            account_ids: vec![account_id],
            network: Network::Testnet,
            topic: MANUAL_TOPIC.to_string(),
        }
    }

    /// The account that signs transactions.
    pub fn primary_account(&self) -> &AccountId {
        // non-empty by construction
        &self.account_ids[0]
    }

    /// True for manually entered sessions with no pairing channel.
    pub fn is_view_only(&self) -> bool {
        self.topic == MANUAL_TOPIC
    }
}

/// Ephemeral signing request forwarded to the wallet library.
///
/// Field names follow the HashConnect JSON wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSigningRequest {
    pub topic: String,
    pub byte_array: Vec<u8>,
    pub metadata: SigningMetadata,
}

/// Signing metadata attached to a [`TransactionSigningRequest`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningMetadata {
    pub account_to_sign: String,
    pub return_transaction: bool,
}

impl TransactionSigningRequest {
    /// Address a payload to the session's primary account.
    pub fn for_session(
        session: &WalletSession,
        payload: Vec<u8>,
        return_transaction: bool,
    ) -> Self {
        Self {
            topic: session.topic.clone(),
            byte_array: payload,
            metadata: SigningMetadata {
                account_to_sign: session.primary_account().to_string(),
                return_transaction,
            },
        }
    }
}
