//! Bridge request and response types shared across the FLOP bridge crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a bridge swap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapOption {
    /// Native FLOP deposited, WFLOP minted.
    #[default]
    FlopToWflop,
    /// WFLOP burned, native FLOP released.
    WflopToFlop,
}

impl SwapOption {
    /// Wire value sent in the `swapOption` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapOption::FlopToWflop => "FLOP_TO_WFLOP",
            SwapOption::WflopToFlop => "WFLOP_TO_FLOP",
        }
    }

    /// Short human label, e.g. for a mode selector.
    pub fn label(&self) -> &'static str {
        match self {
            SwapOption::FlopToWflop => "FLOP to WFLOP",
            SwapOption::WflopToFlop => "WFLOP to FLOP",
        }
    }

    /// The opposite direction.
    pub fn reversed(&self) -> Self {
        match self {
            SwapOption::FlopToWflop => SwapOption::WflopToFlop,
            SwapOption::WflopToFlop => SwapOption::FlopToWflop,
        }
    }
}

impl fmt::Display for SwapOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown swap option: {0} (expected FLOP_TO_WFLOP or WFLOP_TO_FLOP)")]
pub struct UnknownSwapOption(pub String);

impl FromStr for SwapOption {
    type Err = UnknownSwapOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "flop_to_wflop" | "wrap" => Ok(SwapOption::FlopToWflop),
            "wflop_to_flop" | "unwrap" => Ok(SwapOption::WflopToFlop),
            _ => Err(UnknownSwapOption(s.to_string())),
        }
    }
}

/// Rejections raised before a request is ever dispatched.
///
/// The display text is the prompt shown to the user.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Please enter a transaction ID.")]
    MissingTransactionHash,

    #[error("Please enter a valid address for the WFLOP to be sent.")]
    MissingUserAddress,
}

/// A validated bridge swap request.
///
/// Fields are private so that a request with an empty transaction hash or
/// destination address cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    transaction_hash: String,
    user_address: String,
    swap_option: SwapOption,
}

impl BridgeRequest {
    /// Validate and build a request. Inputs are trimmed; whitespace-only
    /// values count as empty.
    pub fn new(
        transaction_hash: &str,
        user_address: &str,
        swap_option: SwapOption,
    ) -> Result<Self, RequestError> {
        let transaction_hash = transaction_hash.trim();
        if transaction_hash.is_empty() {
            return Err(RequestError::MissingTransactionHash);
        }
        let user_address = user_address.trim();
        if user_address.is_empty() {
            return Err(RequestError::MissingUserAddress);
        }
        Ok(Self {
            transaction_hash: transaction_hash.to_string(),
            user_address: user_address.to_string(),
            swap_option,
        })
    }

    pub fn transaction_hash(&self) -> &str {
        &self.transaction_hash
    }

    pub fn user_address(&self) -> &str {
        &self.user_address
    }

    pub fn swap_option(&self) -> SwapOption {
        self.swap_option
    }
}

/// Body of a 2xx reply from the settlement service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapAccepted {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon_tx_hash: Option<String>,
}

/// Body of a non-2xx reply from the settlement service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRejected {
    pub error: String,
}

/// Outcome reported by the settlement service for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeResponse {
    /// Derived from the HTTP status (2xx).
    pub success: bool,
    /// Server message on success, server error text on failure.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_tx_hash: Option<String>,
}

impl BridgeResponse {
    pub fn accepted(body: SwapAccepted) -> Self {
        Self {
            success: true,
            message: body.message,
            polygon_tx_hash: body.polygon_tx_hash.filter(|h| !h.is_empty()),
        }
    }

    pub fn rejected(body: SwapRejected) -> Self {
        Self {
            success: false,
            message: body.error,
            polygon_tx_hash: None,
        }
    }

    /// Status line shown to the user for this response.
    pub fn status_text(&self) -> String {
        if !self.success {
            return format!("{}.", self.message);
        }
        match &self.polygon_tx_hash {
            Some(hash) => format!("Success: {} Polygon TX: {hash}", self.message),
            None => format!("Success: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_with_wire_names() {
        let req = BridgeRequest::new("0xabc123", "0xUser1", SwapOption::FlopToWflop).unwrap();
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "transactionHash": "0xabc123",
                "userAddress": "0xUser1",
                "swapOption": "FLOP_TO_WFLOP",
            })
        );
    }

    #[test]
    fn request_rejects_empty_transaction_hash() {
        let err = BridgeRequest::new("", "0xUser1", SwapOption::FlopToWflop).unwrap_err();
        assert_eq!(err, RequestError::MissingTransactionHash);
        assert_eq!(err.to_string(), "Please enter a transaction ID.");
    }

    #[test]
    fn request_rejects_blank_address() {
        let err = BridgeRequest::new("0xabc", "   ", SwapOption::WflopToFlop).unwrap_err();
        assert_eq!(err, RequestError::MissingUserAddress);
        assert_eq!(
            err.to_string(),
            "Please enter a valid address for the WFLOP to be sent."
        );
    }

    #[test]
    fn transaction_hash_checked_first() {
        let err = BridgeRequest::new("", "", SwapOption::FlopToWflop).unwrap_err();
        assert_eq!(err, RequestError::MissingTransactionHash);
    }

    #[test]
    fn request_trims_inputs() {
        let req = BridgeRequest::new("  0xabc \n", "\t0xUser1 ", SwapOption::WflopToFlop).unwrap();
        assert_eq!(req.transaction_hash(), "0xabc");
        assert_eq!(req.user_address(), "0xUser1");
        assert_eq!(req.swap_option(), SwapOption::WflopToFlop);
    }

    #[test]
    fn swap_option_parses_aliases() {
        assert_eq!("FLOP_TO_WFLOP".parse::<SwapOption>(), Ok(SwapOption::FlopToWflop));
        assert_eq!("flop-to-wflop".parse::<SwapOption>(), Ok(SwapOption::FlopToWflop));
        assert_eq!("wrap".parse::<SwapOption>(), Ok(SwapOption::FlopToWflop));
        assert_eq!("wflop_to_flop".parse::<SwapOption>(), Ok(SwapOption::WflopToFlop));
        assert_eq!("Unwrap".parse::<SwapOption>(), Ok(SwapOption::WflopToFlop));
        assert!("sideways".parse::<SwapOption>().is_err());
    }

    #[test]
    fn swap_option_defaults_and_reverses() {
        assert_eq!(SwapOption::default(), SwapOption::FlopToWflop);
        assert_eq!(SwapOption::FlopToWflop.reversed(), SwapOption::WflopToFlop);
        assert_eq!(SwapOption::WflopToFlop.to_string(), "WFLOP_TO_FLOP");
    }

    #[test]
    fn accepted_body_without_hash_deserializes() {
        let body: SwapAccepted = serde_json::from_str(r#"{"message":"queued"}"#).unwrap();
        assert_eq!(body.polygon_tx_hash, None);
    }

    #[test]
    fn status_text_with_settlement_reference() {
        let resp = BridgeResponse::accepted(SwapAccepted {
            message: "Swap complete".to_string(),
            polygon_tx_hash: Some("0xdef456".to_string()),
        });
        assert_eq!(resp.status_text(), "Success: Swap complete Polygon TX: 0xdef456");
    }

    #[test]
    fn status_text_without_settlement_reference() {
        let resp = BridgeResponse::accepted(SwapAccepted {
            message: "Swap queued".to_string(),
            polygon_tx_hash: Some(String::new()),
        });
        assert_eq!(resp.polygon_tx_hash, None);
        assert_eq!(resp.status_text(), "Success: Swap queued");
    }

    #[test]
    fn status_text_for_rejection_appends_period() {
        let resp = BridgeResponse::rejected(SwapRejected {
            error: "Transaction already processed".to_string(),
        });
        assert!(!resp.success);
        assert_eq!(resp.status_text(), "Transaction already processed.");
    }
}
