// crates/bondline-protocol/src/config.rs
//
// Deployment configuration for a Bondline protocol instance.
// Loaded from a TOML file or populated with defaults; every field is optional.

use serde::{Deserialize, Serialize};
use std::fs;

use bondline_core::{AccountId, BondlineError, DEFAULT_CURVE_K};
use bondline_gateway::{EquityRecipient, DEFAULT_EQUITY_CONVERSION_BPS};
use bondline_governor::DEFAULT_MIN_DELAY_SECS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Deployer and initial owner of the ledgers and the gateway.
    #[serde(default = "default_owner")]
    pub owner: AccountId,

    /// Protocol fee recipient on both ledgers. Defaults to the owner.
    #[serde(default)]
    pub fee_destination: Option<AccountId>,

    /// Curve constant of the content (quadratic) market.
    #[serde(default = "default_curve_k")]
    pub content_curve_k: u64,

    /// Curve constant of the creator (cubic) market.
    #[serde(default = "default_curve_k")]
    pub creator_curve_k: u64,

    #[serde(default = "default_true")]
    pub last_share_protected: bool,

    #[serde(default)]
    pub protocol_fee_bps: u32,

    #[serde(default)]
    pub subject_fee_bps: u32,

    /// Share of raw content cost converted into creator equity, in bps.
    #[serde(default = "default_equity_conversion_bps")]
    pub equity_conversion_bps: u32,

    #[serde(default)]
    pub equity_recipient: EquityRecipient,

    /// Whether the gateway is left paused after deployment.
    #[serde(default = "default_true")]
    pub start_paused: bool,

    #[serde(default)]
    pub addresses: InstanceAddresses,

    #[serde(default)]
    pub governance: GovernanceConfig,
}

/// Addresses the deployed instances answer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceAddresses {
    #[serde(default = "default_content_ledger")]
    pub content_ledger: AccountId,
    #[serde(default = "default_creator_ledger")]
    pub creator_ledger: AccountId,
    #[serde(default = "default_gateway")]
    pub gateway: AccountId,
    #[serde(default = "default_governor")]
    pub governor: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    #[serde(default = "default_min_delay_secs")]
    pub min_delay_secs: u64,
    #[serde(default)]
    pub proposers: Vec<AccountId>,
    #[serde(default)]
    pub executors: Vec<AccountId>,
    #[serde(default)]
    pub cancellers: Vec<AccountId>,
    /// Role administrator. Defaults to the owner.
    #[serde(default)]
    pub admin: Option<AccountId>,
    /// Hand ownership of the ledgers and the gateway to the governor once
    /// deployment is configured.
    #[serde(default)]
    pub transfer_ownership: bool,
}

fn default_owner() -> AccountId {
    AccountId::from_label("deployer")
}

fn default_curve_k() -> u64 {
    DEFAULT_CURVE_K as u64
}

fn default_true() -> bool {
    true
}

fn default_equity_conversion_bps() -> u32 {
    DEFAULT_EQUITY_CONVERSION_BPS
}

fn default_min_delay_secs() -> u64 {
    DEFAULT_MIN_DELAY_SECS
}

fn default_content_ledger() -> AccountId {
    AccountId::from_label("content-ledger")
}

fn default_creator_ledger() -> AccountId {
    AccountId::from_label("creator-ledger")
}

fn default_gateway() -> AccountId {
    AccountId::from_label("gateway")
}

fn default_governor() -> AccountId {
    AccountId::from_label("timelock")
}

impl Default for InstanceAddresses {
    fn default() -> Self {
        Self {
            content_ledger: default_content_ledger(),
            creator_ledger: default_creator_ledger(),
            gateway: default_gateway(),
            governor: default_governor(),
        }
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            min_delay_secs: default_min_delay_secs(),
            proposers: Vec::new(),
            executors: Vec::new(),
            cancellers: Vec::new(),
            admin: None,
            transfer_ownership: false,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            fee_destination: None,
            content_curve_k: default_curve_k(),
            creator_curve_k: default_curve_k(),
            last_share_protected: default_true(),
            protocol_fee_bps: 0,
            subject_fee_bps: 0,
            equity_conversion_bps: default_equity_conversion_bps(),
            equity_recipient: EquityRecipient::default(),
            start_paused: default_true(),
            addresses: InstanceAddresses::default(),
            governance: GovernanceConfig::default(),
        }
    }
}

impl ProtocolConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &str) -> Result<Self, BondlineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| BondlineError::Config(format!("cannot read {}: {}", path, e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, BondlineError> {
        toml::from_str(contents).map_err(|e| BondlineError::Config(e.to_string()))
    }

    pub fn fee_destination(&self) -> AccountId {
        self.fee_destination.unwrap_or(self.owner)
    }

    pub fn admin(&self) -> AccountId {
        self.governance.admin.unwrap_or(self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config = ProtocolConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProtocolConfig::default());
        assert_eq!(config.content_curve_k, 32_000);
        assert_eq!(config.governance.min_delay_secs, 48 * 60 * 60);
        assert!(config.start_paused);
        assert_eq!(config.fee_destination(), config.owner);
    }

    #[test]
    fn test_parse_full_config() {
        let config = ProtocolConfig::from_toml_str(
            r#"
            owner = "alice"
            fee_destination = "treasury"
            protocol_fee_bps = 500
            subject_fee_bps = 500
            equity_conversion_bps = 10000
            equity_recipient = "buyer"
            start_paused = false

            [governance]
            min_delay_secs = 60
            proposers = ["p1"]
            executors = ["e1", "e2"]
            cancellers = ["c1"]
            transfer_ownership = true
            "#,
        )
        .unwrap();
        assert_eq!(config.owner, AccountId::from_label("alice"));
        assert_eq!(config.fee_destination(), AccountId::from_label("treasury"));
        assert_eq!(config.equity_recipient, EquityRecipient::Buyer);
        assert_eq!(config.governance.executors.len(), 2);
        assert_eq!(config.admin(), AccountId::from_label("alice"));
        assert_eq!(config.addresses, InstanceAddresses::default());
    }

    #[test]
    fn test_rejects_malformed_values() {
        assert!(matches!(
            ProtocolConfig::from_toml_str("owner = \"0x12\""),
            Err(BondlineError::Config(_))
        ));
        assert!(ProtocolConfig::from_toml_str("protocol_fee_bps = -5").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ProtocolConfig::load("/nonexistent/bondline.toml"),
            Err(BondlineError::Config(_))
        ));
    }
}
