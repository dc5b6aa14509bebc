// crates/bondline-gateway/src/lib.rs
//
// bondline-gateway: Trading gateway of the Bondline protocol.
//
// The gateway is the authorized caller of both share ledgers. Each trade it
// runs pairs a content-share leg with a creator-equity leg and lands both or
// neither.

pub mod config;
pub mod gateway;

pub use config::{EquityRecipient, GatewayConfig, DEFAULT_EQUITY_CONVERSION_BPS};
pub use gateway::{GatewayReceipt, PriceDetails, TradingGateway};
