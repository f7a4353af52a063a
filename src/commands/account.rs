//! Account lookup command

use anyhow::Result;

use crate::mirror::MirrorClient;
use crate::session::AccountId;

use super::{format_hbar, print_error};

/// Run the account command
pub async fn run(mirror: &MirrorClient, id: &str) -> Result<()> {
    let account_id: AccountId = match id.parse() {
        Ok(id) => id,
        Err(err) => {
            print_error(&err.to_string());
            return Ok(());
        }
    };

    let account = mirror.get_account(&account_id).await?;

    println!("Account:  {}", account.account);
    println!("Balance:  {}", format_hbar(account.balance.balance));

    if !account.balance.tokens.is_empty() {
        println!();
        println!("Tokens ({}):", account.balance.tokens.len());
        for token in &account.balance.tokens {
            println!("  {}  balance {}", token.token_id, token.balance);
        }
    }

    Ok(())
}

/// Run the tokens command
pub async fn run_tokens(mirror: &MirrorClient, id: &str) -> Result<()> {
    let account_id: AccountId = match id.parse() {
        Ok(id) => id,
        Err(err) => {
            print_error(&err.to_string());
            return Ok(());
        }
    };

    let tokens = mirror.get_account_tokens(&account_id).await?;

    if tokens.is_empty() {
        println!("No token balances for {}", account_id);
        return Ok(());
    }

    println!("Token balances for {}:", account_id);
    for token in &tokens {
        println!("  {}  balance {}", token.token_id, token.balance);
    }

    Ok(())
}
