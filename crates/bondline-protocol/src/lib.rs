// crates/bondline-protocol/src/lib.rs
//
// bondline-protocol: A deployed Bondline instance and its host environment.
//
// Wires the content and creator ledgers, the trading gateway and the
// timelock governor to an in-process bank and ledger clock, loads deployment
// settings from TOML, and offers a shared handle for concurrent callers.

pub mod config;
pub mod protocol;
pub mod shared;

pub use config::{GovernanceConfig, InstanceAddresses, ProtocolConfig};
pub use protocol::{Protocol, ProtocolAudit, Targets};
pub use shared::SharedProtocol;
