// crates/bondline-cli/src/commands/mod.rs
//
// Command module declarations for the Bondline CLI, plus argument parsers
// shared between them.

pub mod curve;
pub mod init;
pub mod quote;
pub mod replay;

use bondline_core::{parse_amount, AccountId};

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir().ok_or("Could not determine home directory")?;
            Ok(home.join(rest).display().to_string())
        }
        None => Ok(path.to_string()),
    }
}

/// clap value parser for native amounts and share quantities.
pub fn amount_arg(s: &str) -> Result<u128, String> {
    parse_amount(s).map_err(|e| e.to_string())
}

/// clap value parser for accounts: `0x` hex or a label.
pub fn account_arg(s: &str) -> Result<AccountId, String> {
    AccountId::parse(s).map_err(|e| e.to_string())
}
