//! flop-core — data model and configuration for the FLOP ↔ WFLOP bridge client.
//!
//! A [`BridgeRequest`] can only be built through validation, so an empty
//! transaction hash or destination address never reaches the wire.
//! [`ModeView`] holds the per-direction text the form displays, and
//! [`BridgeConfig`] layers `flop.toml` under environment overrides.

pub mod config;
pub mod types;
pub mod view;

pub use config::{BridgeConfig, ConfigError, DepositAddresses};
pub use types::*;
pub use view::ModeView;
