use std::process::ExitCode;

use flop_client::{FormError, Submission};
use flop_core::{BridgeConfig, SwapOption};
use tracing::info;

use crate::Format;

pub struct SwapArgs {
    pub mode: SwapOption,
    pub tx: String,
    pub address: Option<String>,
    pub connect: bool,
    pub format: Format,
}

/// How a swap command ended.
#[derive(Debug)]
pub enum SwapOutcome {
    /// Refused locally before any request was sent.
    Refused(String),
    Completed(Submission),
}

impl SwapOutcome {
    pub fn exit_status(&self) -> u8 {
        match self {
            SwapOutcome::Refused(_) => 2,
            SwapOutcome::Completed(submission) if submission.succeeded() => 0,
            SwapOutcome::Completed(_) => 1,
        }
    }

    /// Text for stdout, or `None` when the outcome only goes to stderr.
    pub fn render(&self, format: Format) -> anyhow::Result<Option<String>> {
        let SwapOutcome::Completed(submission) = self else {
            return Ok(None);
        };
        let out = match format {
            Format::Json => serde_json::to_string_pretty(submission)?,
            Format::Text => submission.status.text.clone(),
        };
        Ok(Some(out))
    }
}

pub async fn run(config: &BridgeConfig, args: &SwapArgs) -> anyhow::Result<SwapOutcome> {
    let form = flop_client::build_form(config)?;
    let view = form.set_swap_option(args.mode);

    if args.connect {
        if !view.wallet_connect {
            anyhow::bail!("wallet connect is only offered for {}", SwapOption::FlopToWflop.label());
        }
        match form.connect().await {
            Ok(Some(account)) => info!(%account, "using wallet account as default address"),
            Ok(None) => {}
            Err(e @ FormError::WalletUnavailable) => return Ok(SwapOutcome::Refused(e.to_string())),
            Err(e) => return Err(e.into()),
        }
    }

    // An explicit address wins over the wallet account.
    if let Some(address) = &args.address {
        form.set_user_address(address.as_str())?;
    }
    form.set_transaction_hash(args.tx.as_str())?;

    match form.submit().await {
        Ok(submission) => Ok(SwapOutcome::Completed(submission)),
        Err(e @ FormError::Invalid(_)) => Ok(SwapOutcome::Refused(e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub async fn swap(config: &BridgeConfig, args: SwapArgs) -> anyhow::Result<ExitCode> {
    let outcome = run(config, &args).await?;
    match outcome.render(args.format)? {
        Some(out) => println!("{out}"),
        None => {
            if let SwapOutcome::Refused(reason) = &outcome {
                eprintln!("{reason}");
            }
        }
    }
    Ok(ExitCode::from(outcome.exit_status()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{Value, json};

    type Seen = Arc<Mutex<Vec<Value>>>;

    /// Settlement route plus a wallet JSON-RPC route on one listener.
    async fn serve(status: StatusCode, reply: Value, seen: Seen) -> SocketAddr {
        let router = Router::new()
            .route(
                "/api/bridge-swap",
                post(move |State(seen): State<Seen>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        seen.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                }),
            )
            .route(
                "/",
                post(|Json(req): Json<Value>| async move {
                    Json(json!({"jsonrpc": "2.0", "id": req["id"].clone(), "result": ["0xWallet"]}))
                }),
            )
            .with_state(seen);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn config_for(addr: SocketAddr, wallet: bool) -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.bridge.endpoint = format!("http://{addr}");
        config.deposit.flop = Some("FDeposit".to_string());
        config.deposit.wflop = Some("0xBurn".to_string());
        if wallet {
            config.wallet.rpc_url = Some(format!("http://{addr}"));
        }
        config
    }

    fn args(mode: SwapOption, address: Option<&str>, connect: bool) -> SwapArgs {
        SwapArgs {
            mode,
            tx: "0xabc123".to_string(),
            address: address.map(str::to_string),
            connect,
            format: Format::Text,
        }
    }

    fn accepted() -> Value {
        json!({"message": "Swap complete", "polygonTxHash": "0xdef456"})
    }

    #[tokio::test]
    async fn explicit_address_wins_over_wallet_account() {
        let seen: Seen = Arc::default();
        let addr = serve(StatusCode::OK, accepted(), seen.clone()).await;

        let outcome = run(
            &config_for(addr, true),
            &args(SwapOption::FlopToWflop, Some("0xTyped"), true),
        )
        .await
        .unwrap();
        assert_eq!(outcome.exit_status(), 0);
        assert_eq!(seen.lock().unwrap()[0]["userAddress"], "0xTyped");
    }

    #[tokio::test]
    async fn connect_fills_address_when_none_given() {
        let seen: Seen = Arc::default();
        let addr = serve(StatusCode::OK, accepted(), seen.clone()).await;

        let outcome = run(&config_for(addr, true), &args(SwapOption::FlopToWflop, None, true))
            .await
            .unwrap();
        assert_eq!(outcome.exit_status(), 0);
        assert_eq!(seen.lock().unwrap()[0]["userAddress"], "0xWallet");
    }

    #[tokio::test]
    async fn connect_in_unwrap_mode_is_an_error() {
        let seen: Seen = Arc::default();
        let addr = serve(StatusCode::OK, accepted(), seen.clone()).await;

        let result = run(
            &config_for(addr, true),
            &args(SwapOption::WflopToFlop, Some("FUser"), true),
        )
        .await;
        assert!(result.is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_address_exits_with_usage_status() {
        let seen: Seen = Arc::default();
        let addr = serve(StatusCode::OK, accepted(), seen.clone()).await;

        let outcome = run(&config_for(addr, false), &args(SwapOption::FlopToWflop, None, false))
            .await
            .unwrap();
        assert_eq!(outcome.exit_status(), 2);
        assert!(matches!(
            &outcome,
            SwapOutcome::Refused(reason)
                if reason == "Please enter a valid address for the WFLOP to be sent."
        ));
        assert_eq!(outcome.render(Format::Text).unwrap(), None);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn connect_without_wallet_exits_with_usage_status() {
        let seen: Seen = Arc::default();
        let addr = serve(StatusCode::OK, accepted(), seen.clone()).await;

        let outcome = run(
            &config_for(addr, false),
            &args(SwapOption::FlopToWflop, Some("0xTyped"), true),
        )
        .await
        .unwrap();
        assert_eq!(outcome.exit_status(), 2);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn server_rejection_exits_nonzero() {
        let seen: Seen = Arc::default();
        let addr = serve(
            StatusCode::BAD_REQUEST,
            json!({"error": "Transaction not found"}),
            seen,
        )
        .await;

        let outcome = run(&config_for(addr, false), &args(SwapOption::WflopToFlop, Some("FUser"), false))
            .await
            .unwrap();
        assert_eq!(outcome.exit_status(), 1);
        assert_eq!(
            outcome.render(Format::Text).unwrap().as_deref(),
            Some("Transaction not found.")
        );
    }

    #[tokio::test]
    async fn unreachable_service_exits_nonzero() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = run(&config_for(addr, false), &args(SwapOption::FlopToWflop, Some("0xU"), false))
            .await
            .unwrap();
        assert_eq!(outcome.exit_status(), 1);
        assert_eq!(
            outcome.render(Format::Text).unwrap().as_deref(),
            Some(flop_client::form::FALLBACK_ERROR_TEXT)
        );
    }

    #[tokio::test]
    async fn json_output_carries_status_and_response() {
        let seen: Seen = Arc::default();
        let addr = serve(StatusCode::OK, accepted(), seen).await;

        let outcome = run(&config_for(addr, false), &args(SwapOption::FlopToWflop, Some("0xU"), false))
            .await
            .unwrap();
        let out = outcome.render(Format::Json).unwrap().unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"]["kind"], "success");
        assert_eq!(
            value["status"]["text"],
            "Success: Swap complete Polygon TX: 0xdef456"
        );
        assert_eq!(value["response"]["success"], true);
    }
}
