use std::process::ExitCode;

use flop_core::{BridgeConfig, ModeView, SwapOption};

use crate::Format;

pub fn info(config: &BridgeConfig, mode: SwapOption, format: Format) -> anyhow::Result<ExitCode> {
    let view = ModeView::for_option(mode, &config.deposit);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        Format::Text => println!("{}", view.render()),
    }

    Ok(ExitCode::SUCCESS)
}
