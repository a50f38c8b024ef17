//! flop-client — the FLOP ↔ WFLOP bridge request client.
//!
//! # Architecture
//!
//! ```text
//! BridgeForm (single-flight state machine)
//!   ├── SettlementService ── HttpSettlement ── POST /api/bridge-swap
//!   └── WalletProvider    ── RpcWallet      ── eth_requestAccounts
//!                     both over HttpTransport (HTTP/1.1, optional TLS)
//! ```
//!
//! The service and wallet sit behind traits so the form can be driven
//! against stubs in tests.

pub mod form;
pub mod settlement;
pub mod transport;
pub mod wallet;

use std::sync::Arc;

use flop_core::{BridgeConfig, ConfigError};
use thiserror::Error;
use tracing::debug;

pub use form::{BridgeForm, FormError, FormSnapshot, Phase, Status, StatusKind, Submission};
pub use settlement::{HttpSettlement, SettlementService};
pub use transport::{Endpoint, HttpTransport, TransportError};
pub use wallet::{RpcWallet, WalletError, WalletProvider};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Wire a form to the services named in `config`.
///
/// The wallet is attached only when `wallet.rpc_url` is set.
pub fn build_form(config: &BridgeConfig) -> Result<BridgeForm, SetupError> {
    let transport = HttpTransport::new(config.request_timeout()?)?;
    let service = HttpSettlement::from_config(config, transport.clone())?;
    let mut form = BridgeForm::new(Arc::new(service), config.deposit.clone());

    if let Some(rpc_url) = &config.wallet.rpc_url {
        let endpoint = Endpoint::parse(rpc_url)?;
        debug!(%rpc_url, "wallet provider configured");
        form = form.with_wallet(Arc::new(RpcWallet::new(endpoint, transport)));
    }
    Ok(form)
}
