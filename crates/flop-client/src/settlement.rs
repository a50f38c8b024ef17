//! Settlement service client for `POST /api/bridge-swap`.

use std::future::Future;
use std::pin::Pin;

use flop_core::{BridgeConfig, BridgeRequest, BridgeResponse, SwapAccepted, SwapRejected};
use http::StatusCode;
use tracing::{debug, info, warn};

use crate::transport::{Endpoint, HttpTransport, TransportError};

/// Path of the bridge swap call, relative to the service base URL.
pub const BRIDGE_SWAP_PATH: &str = "/api/bridge-swap";

/// Boxed future alias for settlement service calls.
pub type SwapFuture<'a> =
    Pin<Box<dyn Future<Output = Result<BridgeResponse, TransportError>> + Send + 'a>>;

/// The remote service that validates a deposit/burn and settles the swap.
///
/// `Ok` covers both accepted (2xx) and rejected (non-2xx) replies; `Err`
/// is reserved for transport and decoding failures.
pub trait SettlementService: Send + Sync {
    fn bridge_swap<'a>(&'a self, request: &'a BridgeRequest) -> SwapFuture<'a>;
}

/// Settlement service reached over HTTP(S).
#[derive(Clone)]
pub struct HttpSettlement {
    endpoint: Endpoint,
    transport: HttpTransport,
}

impl HttpSettlement {
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    /// Build from `bridge.endpoint`, sharing an existing transport.
    pub fn from_config(
        config: &BridgeConfig,
        transport: HttpTransport,
    ) -> Result<Self, TransportError> {
        let endpoint = Endpoint::parse(&config.bridge.endpoint)?;
        Ok(Self::new(endpoint, transport))
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn call(&self, request: &BridgeRequest) -> Result<BridgeResponse, TransportError> {
        let body = serde_json::to_vec(request)?;
        debug!(
            tx = request.transaction_hash(),
            option = %request.swap_option(),
            "sending bridge swap request"
        );
        let reply = self
            .transport
            .post_json(&self.endpoint, BRIDGE_SWAP_PATH, body)
            .await?;
        decode_reply(reply.status, &reply.body)
    }
}

impl SettlementService for HttpSettlement {
    fn bridge_swap<'a>(&'a self, request: &'a BridgeRequest) -> SwapFuture<'a> {
        Box::pin(self.call(request))
    }
}

/// Interpret a settlement reply by status class.
///
/// A body that does not match the expected shape for its status is a
/// decode error, never a partially filled response.
pub fn decode_reply(status: StatusCode, body: &[u8]) -> Result<BridgeResponse, TransportError> {
    if status.is_success() {
        let accepted: SwapAccepted = serde_json::from_slice(body)?;
        info!(
            %status,
            polygon_tx = accepted.polygon_tx_hash.as_deref().unwrap_or("-"),
            "bridge swap accepted"
        );
        Ok(BridgeResponse::accepted(accepted))
    } else {
        let rejected: SwapRejected = serde_json::from_slice(body)?;
        warn!(%status, error = %rejected.error, "bridge swap rejected");
        Ok(BridgeResponse::rejected(rejected))
    }
}
