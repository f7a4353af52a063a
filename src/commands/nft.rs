//! NFT lookup commands

use anyhow::Result;

use crate::mirror::MirrorClient;
use crate::session::AccountId;

use super::print_error;

/// Run the nft command (single NFT by token id and serial)
pub async fn run(mirror: &MirrorClient, token_id: &str, serial: u64) -> Result<()> {
    let nft = mirror.get_nft(token_id, serial).await?;

    println!("NFT:       {} #{}", nft.token_id, nft.serial_number);
    println!("Owner:     {}", nft.account_id);
    match &nft.metadata {
        Some(metadata) => println!("Metadata:  {}", metadata),
        None => println!("Metadata:  (none)"),
    }

    Ok(())
}

/// Run the nfts command (all NFTs owned by an account)
pub async fn run_for_account(mirror: &MirrorClient, id: &str) -> Result<()> {
    let account_id: AccountId = match id.parse() {
        Ok(id) => id,
        Err(err) => {
            print_error(&err.to_string());
            return Ok(());
        }
    };

    let nfts = mirror.get_account_nfts(&account_id).await?;

    if nfts.is_empty() {
        println!("No NFTs owned by {}", account_id);
        return Ok(());
    }

    println!("NFTs owned by {} ({}):", account_id, nfts.len());
    for nft in &nfts {
        println!("  {} #{}", nft.token_id, nft.serial_number);
    }

    Ok(())
}
