//! Per-mode display text for the bridge form.

use serde::Serialize;

use crate::config::DepositAddresses;
use crate::types::SwapOption;

/// Submit control label while idle.
pub const SUBMIT_LABEL: &str = "Submit Transaction";
/// Submit control label while a request is in flight.
pub const SUBMIT_BUSY_LABEL: &str = "Processing...";

/// Everything the form shows for one swap mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeView {
    pub swap_option: SwapOption,
    pub title: &'static str,
    pub instruction: &'static str,
    /// Deposit (FLOP) or burn (WFLOP) address, rendered verbatim.
    pub address: String,
    pub follow_up: &'static str,
    pub address_label: &'static str,
    pub address_placeholder: &'static str,
    /// Whether a wallet connect action is offered in this mode.
    pub wallet_connect: bool,
}

impl ModeView {
    pub fn for_option(option: SwapOption, addresses: &DepositAddresses) -> Self {
        match option {
            SwapOption::FlopToWflop => Self {
                swap_option: option,
                title: "FLOP to WFLOP Bridge",
                instruction: "To swap FLOP to WFLOP, please send your FLOP tokens to the following deposit address:",
                address: addresses.flop.clone().unwrap_or_default(),
                follow_up: "Once the transfer is confirmed, enter the transaction ID and the address where you'd like to receive your WFLOP tokens.",
                address_label: "Enter WFLOP Address to receive tokens:",
                address_placeholder: "Enter WFLOP address",
                wallet_connect: true,
            },
            SwapOption::WflopToFlop => Self {
                swap_option: option,
                title: "WFLOP to FLOP Bridge",
                instruction: "To swap WFLOP to FLOP, please send your WFLOP tokens to the designated burn address:",
                address: addresses.wflop.clone().unwrap_or_default(),
                follow_up: "Once the transfer is confirmed, enter the transaction ID and the FLOP address where you'd like to receive your tokens.",
                address_label: "Enter FLOP Address to receive coins:",
                address_placeholder: "Enter FLOP address",
                wallet_connect: false,
            },
        }
    }

    /// Plain-text rendering, one element per line.
    pub fn render(&self) -> String {
        format!(
            "{}\n\n{}\n{}\n{}\n\n{}",
            self.title, self.instruction, self.address, self.follow_up, self.address_label
        )
    }
}

pub fn submit_label(busy: bool) -> &'static str {
    if busy { SUBMIT_BUSY_LABEL } else { SUBMIT_LABEL }
}
