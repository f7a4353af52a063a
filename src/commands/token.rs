//! Token lookup command

use anyhow::Result;

use crate::mirror::{MirrorClient, TokenType};

/// Run the token command
pub async fn run(mirror: &MirrorClient, token_id: &str) -> Result<()> {
    let token = mirror.get_token(token_id).await?;

    let kind = match token.token_type {
        TokenType::FungibleCommon => "fungible",
        TokenType::NonFungibleUnique => "non-fungible",
    };

    println!("Token:     {} ({})", token.token_id, kind);
    println!("Name:      {}", token.name);
    println!("Symbol:    {}", token.symbol);
    println!("Decimals:  {}", token.decimals);
    println!("Supply:    {}", token.total_supply);
    println!("Treasury:  {}", token.treasury_account_id);

    Ok(())
}
