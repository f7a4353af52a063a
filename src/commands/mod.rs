//! CLI commands
//!
//! Implementation of the wallet-connect CLI commands.

pub mod account;
pub mod connect;
pub mod nft;
pub mod token;
pub mod transaction;

/// Tinybars per HBAR.
const TINYBARS_PER_HBAR: i64 = 100_000_000;

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("\x1b[31mError:\x1b[0m {}", message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("\x1b[32m{}\x1b[0m", message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("\x1b[33mWarning:\x1b[0m {}", message);
}

/// Format a tinybar amount as HBAR
pub fn format_hbar(tinybars: i64) -> String {
    let whole = tinybars / TINYBARS_PER_HBAR;
    let frac = (tinybars % TINYBARS_PER_HBAR).abs();
    format!("{}.{:08} HBAR", whole, frac)
}
