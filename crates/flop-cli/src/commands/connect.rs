use std::process::ExitCode;

use flop_client::FormError;
use flop_core::BridgeConfig;

#[derive(Debug, PartialEq, Eq)]
pub enum ConnectOutcome {
    Account(String),
    /// The wallet refused, failed, or had no accounts.
    NoAccount,
    /// No wallet provider is configured.
    Unavailable(String),
}

impl ConnectOutcome {
    pub fn exit_status(&self) -> u8 {
        match self {
            ConnectOutcome::Account(_) => 0,
            ConnectOutcome::NoAccount => 1,
            ConnectOutcome::Unavailable(_) => 2,
        }
    }
}

pub async fn run(config: &BridgeConfig) -> anyhow::Result<ConnectOutcome> {
    let form = flop_client::build_form(config)?;

    match form.connect().await {
        Ok(Some(account)) => Ok(ConnectOutcome::Account(account)),
        Ok(None) => Ok(ConnectOutcome::NoAccount),
        Err(e @ FormError::WalletUnavailable) => Ok(ConnectOutcome::Unavailable(e.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub async fn connect(config: &BridgeConfig) -> anyhow::Result<ExitCode> {
    let outcome = run(config).await?;
    match &outcome {
        ConnectOutcome::Account(account) => println!("{account}"),
        ConnectOutcome::NoAccount => eprintln!("Wallet did not provide an account."),
        ConnectOutcome::Unavailable(reason) => eprintln!("{reason}"),
    }
    Ok(ExitCode::from(outcome.exit_status()))
}
