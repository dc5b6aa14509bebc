// crates/bondline-cli/src/commands/init.rs
//
// `bondline init`: write a default deployment configuration.

use std::fs;
use std::path::Path;

use bondline_protocol::ProtocolConfig;

/// Run the init command.
pub async fn run(path: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let target = Path::new(path);
    if target.exists() && !force {
        println!("Configuration already exists at {}", target.display());
        println!("Pass --force to overwrite it.");
        return Ok(());
    }
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(&ProtocolConfig::default())?;
    fs::write(target, contents)?;
    tracing::info!("Wrote default configuration to {}", target.display());

    println!("Bondline configuration written to {}", target.display());
    println!("  Trading starts paused; set start_paused = false to open it.");
    Ok(())
}
