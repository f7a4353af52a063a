//! Transaction lookup command

use anyhow::Result;

use crate::mirror::MirrorClient;

use super::{print_error, print_success};

/// Run the transaction command
pub async fn run(mirror: &MirrorClient, transaction_id: &str, verify: bool) -> Result<()> {
    if verify {
        if mirror.verify_transaction(transaction_id).await {
            print_success("Transaction verified: SUCCESS");
        } else {
            print_error("Transaction not verified");
        }
        return Ok(());
    }

    let record = mirror.get_transaction(transaction_id).await?;

    println!(
        "Transaction:  {}",
        record.transaction_id.as_deref().unwrap_or(transaction_id)
    );
    println!("Result:       {}", record.result);
    if let Some(timestamp) = &record.consensus_timestamp {
        println!("Consensus:    {}", timestamp);
    }
    if let Some(fee) = record.charged_tx_fee {
        println!("Fee:          {} tinybars", fee);
    }

    Ok(())
}
