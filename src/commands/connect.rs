//! Wallet connect command

use anyhow::Result;
use std::time::Duration;
use tracing::debug;

use crate::connector::{ConnectorConfig, WalletConnector};
use crate::mirror::MirrorClient;
use crate::pairing::LibrarySlot;
use crate::session::Network;

use super::{format_hbar, print_error, print_success, print_warning};

/// Run the connect command.
///
/// Without `--account` this attempts extension pairing through the pairing
/// library; a standalone CLI process has no library registered, so the
/// library-missing path is reported the same way an embedding application
/// would surface it. With `--account` a view-only session is entered.
pub async fn run(
    network: Network,
    mirror: &MirrorClient,
    account: Option<String>,
    timeout_secs: Option<u64>,
) -> Result<()> {
    let mut config = ConnectorConfig {
        network,
        ..ConnectorConfig::default()
    };
    if let Some(secs) = timeout_secs {
        config.pairing_timeout = Duration::from_secs(secs);
    }

    let connector = WalletConnector::new(config, LibrarySlot::new());
    let subscription = connector.subscribe(|session| match session {
        Some(session) => debug!(account = %session.primary_account(), "session published"),
        None => debug!("session cleared"),
    });

    let session = match account {
        Some(account_id) => match connector.connect_view_only(&account_id) {
            Ok(session) => {
                print_warning(
                    "View-only session. Install the HashPack extension to sign transactions.",
                );
                session
            }
            Err(err) => {
                print_error(&err.to_string());
                return Ok(());
            }
        },
        None => {
            println!("Connecting to wallet...");
            match connector.connect().await {
                Ok(session) => session,
                Err(err) if err.is_library_missing() => {
                    print_error(
                        "Wallet library not found. Install the HashPack extension and retry.",
                    );
                    return Ok(());
                }
                Err(err) => {
                    print_error(&format!("Connection failed: {err}"));
                    return Ok(());
                }
            }
        }
    };

    print_success(&format!("Connected to {}", session.primary_account()));
    println!();
    println!("Network:  {}", session.network);
    println!("Topic:    {}", session.topic);
    if session.account_ids.len() > 1 {
        println!("Accounts:");
        for id in &session.account_ids {
            println!("  {}", id);
        }
    }

    match mirror.get_account(session.primary_account()).await {
        Ok(info) => println!("Balance:  {}", format_hbar(info.balance.balance)),
        Err(err) => print_warning(&format!("Could not fetch balance: {err}")),
    }

    connector.disconnect().await;
    subscription.unsubscribe();
    Ok(())
}
