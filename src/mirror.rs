//! Mirror node REST reader.
//!
//! Stateless typed wrappers over the public Hedera mirror node index. Each
//! call is a single GET against the network's base URL; there are no
//! retries and no caching.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{MirrorError, MirrorResult};
use crate::session::{AccountId, Network};

/// Timeout for mirror node requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Account record as returned by `/accounts/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub account: String,
    pub balance: AccountBalance,
}

/// Balance block of an [`Account`], in tinybars plus token balances.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountBalance {
    pub balance: i64,
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

/// One token position of an account.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenBalance {
    pub token_id: String,
    pub balance: i64,
}

/// Token class record as returned by `/tokens/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    pub token_id: String,
    pub name: String,
    pub symbol: String,
    /// The mirror node serves decimals as a decimal string.
    pub decimals: String,
    pub total_supply: String,
    pub treasury_account_id: String,
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

/// Hedera token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TokenType {
    #[serde(rename = "FUNGIBLE_COMMON")]
    FungibleCommon,
    #[serde(rename = "NON_FUNGIBLE_UNIQUE")]
    NonFungibleUnique,
}

/// NFT record as returned by `/tokens/{id}/nfts/{serial}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Nft {
    pub token_id: String,
    pub serial_number: i64,
    pub account_id: String,
    /// Base64 metadata blob, when the mint set one.
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Transaction record entry from `/transactions/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub result: String,
    #[serde(default)]
    pub consensus_timestamp: Option<String>,
    #[serde(default)]
    pub charged_tx_fee: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct NftList {
    #[serde(default)]
    nfts: Vec<Nft>,
}

#[derive(Debug, Deserialize)]
struct TokenBalanceList {
    #[serde(default)]
    tokens: Vec<TokenBalance>,
}

#[derive(Debug, Deserialize)]
struct TransactionList {
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

/// Read-only client for one mirror node index.
#[derive(Debug, Clone)]
pub struct MirrorClient {
    base_url: String,
    client: reqwest::Client,
}

impl MirrorClient {
    /// Client for the given network's public mirror node.
    pub fn new(network: Network) -> Self {
        Self::with_base_url(network.mirror_base_url())
    }

    /// Client against an explicit base URL (local mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Base URL this client reads from.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> MirrorResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorError::RequestFailed {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| MirrorError::Malformed(err.to_string()))
    }

    /// Account information including balances.
    pub async fn get_account(&self, account_id: &AccountId) -> MirrorResult<Account> {
        self.get_json(&format!("/accounts/{account_id}")).await
    }

    /// Token class information.
    pub async fn get_token(&self, token_id: &str) -> MirrorResult<Token> {
        self.get_json(&format!("/tokens/{token_id}")).await
    }

    /// A single NFT by token id and serial number.
    pub async fn get_nft(&self, token_id: &str, serial_number: u64) -> MirrorResult<Nft> {
        self.get_json(&format!("/tokens/{token_id}/nfts/{serial_number}"))
            .await
    }

    /// All NFTs owned by an account.
    pub async fn get_account_nfts(&self, account_id: &AccountId) -> MirrorResult<Vec<Nft>> {
        let list: NftList = self.get_json(&format!("/accounts/{account_id}/nfts")).await?;
        Ok(list.nfts)
    }

    /// Token balances of an account.
    pub async fn get_account_tokens(
        &self,
        account_id: &AccountId,
    ) -> MirrorResult<Vec<TokenBalance>> {
        let list: TokenBalanceList = self
            .get_json(&format!("/accounts/{account_id}/tokens"))
            .await?;
        Ok(list.tokens)
    }

    /// Transaction record by transaction id.
    ///
    /// The mirror node wraps records in a `transactions` array; the first
    /// entry is returned.
    pub async fn get_transaction(&self, transaction_id: &str) -> MirrorResult<TransactionRecord> {
        let list: TransactionList = self
            .get_json(&format!("/transactions/{transaction_id}"))
            .await?;
        list.transactions
            .into_iter()
            .next()
            .ok_or_else(|| MirrorError::Malformed("empty transaction list".to_string()))
    }

    /// Whether a transaction reached consensus successfully.
    ///
    /// Any failure along the way is a plain `false`, never an error.
    pub async fn verify_transaction(&self, transaction_id: &str) -> bool {
        match self.get_transaction(transaction_id).await {
            Ok(record) => record.result == "SUCCESS",
            Err(_) => false,
        }
    }
}
