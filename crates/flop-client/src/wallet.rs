//! Wallet account lookup.
//!
//! The form only needs one capability from a wallet: `requestAccounts`.
//! [`RpcWallet`] provides it by calling `eth_requestAccounts` on a JSON-RPC
//! endpoint exposed by a local signer or wallet daemon.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::transport::{Endpoint, HttpTransport, TransportError};

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

const REQUEST_ACCOUNTS_METHOD: &str = "eth_requestAccounts";

/// Boxed future alias for account requests.
pub type AccountsFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<String>, WalletError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("user rejected the account request: {0}")]
    Rejected(String),

    #[error("wallet rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("wallet transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

/// Something that can hand out account identifiers on request.
pub trait WalletProvider: Send + Sync {
    /// Ask for account access. The first account is the preferred one.
    fn request_accounts(&self) -> AccountsFuture<'_>;
}

#[derive(Debug, Deserialize)]
struct RpcReply {
    #[serde(default)]
    result: Option<Vec<String>>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Wallet reached over JSON-RPC 2.0.
pub struct RpcWallet {
    endpoint: Endpoint,
    transport: HttpTransport,
    next_id: AtomicU64,
}

impl RpcWallet {
    pub fn new(endpoint: Endpoint, transport: HttpTransport) -> Self {
        Self {
            endpoint,
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self) -> Result<Vec<String>, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": REQUEST_ACCOUNTS_METHOD,
            "params": [],
        });
        let body = serde_json::to_vec(&body).map_err(TransportError::from)?;

        let reply = self.transport.post_json(&self.endpoint, "", body).await?;
        debug!(status = %reply.status, id, "wallet rpc reply");
        parse_accounts_reply(&reply.body)
    }
}

impl WalletProvider for RpcWallet {
    fn request_accounts(&self) -> AccountsFuture<'_> {
        Box::pin(self.call())
    }
}

/// Decode a JSON-RPC reply to `eth_requestAccounts`.
///
/// The reply body is authoritative regardless of HTTP status, since some
/// signers report JSON-RPC errors with a non-2xx status.
fn parse_accounts_reply(body: &[u8]) -> Result<Vec<String>, WalletError> {
    let reply: RpcReply =
        serde_json::from_slice(body).map_err(|e| WalletError::Malformed(e.to_string()))?;

    match (reply.result, reply.error) {
        (_, Some(err)) if err.code == USER_REJECTED_CODE => Err(WalletError::Rejected(err.message)),
        (_, Some(err)) => Err(WalletError::Rpc {
            code: err.code,
            message: err.message,
        }),
        (Some(accounts), None) => Ok(accounts),
        (None, None) => Err(WalletError::Malformed(
            "reply has neither result nor error".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_account_list() {
        let accounts =
            parse_accounts_reply(br#"{"jsonrpc":"2.0","id":1,"result":["0xA","0xB"]}"#).unwrap();
        assert_eq!(accounts, vec!["0xA".to_string(), "0xB".to_string()]);
    }

    #[test]
    fn user_rejection_maps_to_rejected() {
        let err = parse_accounts_reply(
            br#"{"jsonrpc":"2.0","id":1,"error":{"code":4001,"message":"User rejected the request."}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WalletError::Rejected(ref m) if m == "User rejected the request."));
    }

    #[test]
    fn other_rpc_errors_keep_code() {
        let err = parse_accounts_reply(
            br#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, WalletError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn empty_reply_is_malformed() {
        let err = parse_accounts_reply(br#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(matches!(err, WalletError::Malformed(_)));
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_accounts_reply(b"not json"),
            Err(WalletError::Malformed(_))
        ));
    }
}
