//! Bridge form state machine.
//!
//! ```text
//!   Idle ──submit──▶ Submitting ──▶ Success
//!    ▲                          └──▶ Error
//!    └──────────── next edit ────────┘
//! ```
//!
//! At most one submission is in flight per form. The busy flag is claimed
//! with a compare-and-swap and released by a drop guard, so it clears on
//! every exit path, including a dropped future. The flag only changes while
//! the state lock is held, and every check that gates a state change is made
//! under that same lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use flop_core::view::submit_label;
use flop_core::{BridgeRequest, BridgeResponse, DepositAddresses, ModeView, RequestError, SwapOption};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::settlement::SettlementService;
use crate::wallet::WalletProvider;

/// Status text while a submission is in flight.
pub const PROCESSING_TEXT: &str = "Processing transaction...";
/// Status text for any transport or decoding failure.
pub const FALLBACK_ERROR_TEXT: &str = "An unexpected issue occurred. Please try again later.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] RequestError),

    #[error("a bridge request is already in flight")]
    Busy,

    #[error("Please configure a wallet provider to connect.")]
    WalletUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    #[default]
    Neutral,
    Success,
    Error,
}

/// The status line under the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Result of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub status: Status,
    /// `None` when the exchange failed before a usable reply arrived.
    pub response: Option<BridgeResponse>,
}

impl Submission {
    pub fn succeeded(&self) -> bool {
        self.status.kind == StatusKind::Success
    }
}

/// Point-in-time copy of everything the form displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub swap_option: SwapOption,
    pub transaction_hash: String,
    pub user_address: String,
    pub account: Option<String>,
    pub phase: Phase,
    pub status: Status,
    pub busy: bool,
    pub submit_label: &'static str,
    pub view: ModeView,
}

#[derive(Debug)]
struct FormState {
    swap_option: SwapOption,
    transaction_hash: String,
    user_address: String,
    account: Option<String>,
    phase: Phase,
    status: Status,
}

/// Client-side bridge form bound to one settlement service.
pub struct BridgeForm {
    service: Arc<dyn SettlementService>,
    wallet: Option<Arc<dyn WalletProvider>>,
    addresses: DepositAddresses,
    state: Mutex<FormState>,
    busy: AtomicBool,
}

/// Holds the busy flag for the duration of one submission.
struct InFlight<'a> {
    form: &'a BridgeForm,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.form.state();
        if state.phase == Phase::Submitting {
            // The submission future was dropped before completing.
            state.phase = Phase::Idle;
        }
        self.form.busy.store(false, Ordering::Release);
    }
}

impl BridgeForm {
    pub fn new(service: Arc<dyn SettlementService>, addresses: DepositAddresses) -> Self {
        Self {
            service,
            wallet: None,
            addresses,
            state: Mutex::new(FormState {
                swap_option: SwapOption::default(),
                transaction_hash: String::new(),
                user_address: String::new(),
                account: None,
                phase: Phase::Idle,
                status: Status::default(),
            }),
            busy: AtomicBool::new(false),
        }
    }

    /// Attach a wallet provider, enabling [`BridgeForm::connect`].
    pub fn with_wallet(mut self, wallet: Arc<dyn WalletProvider>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet.is_some()
    }

    pub fn swap_option(&self) -> SwapOption {
        self.state().swap_option
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn status(&self) -> Status {
        self.state().status.clone()
    }

    pub fn account(&self) -> Option<String> {
        self.state().account.clone()
    }

    /// Display text for the currently selected mode.
    pub fn view(&self) -> ModeView {
        ModeView::for_option(self.swap_option(), &self.addresses)
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.state();
        let busy = self.is_busy();
        FormSnapshot {
            swap_option: state.swap_option,
            transaction_hash: state.transaction_hash.clone(),
            user_address: state.user_address.clone(),
            account: state.account.clone(),
            phase: state.phase,
            status: state.status.clone(),
            busy,
            submit_label: submit_label(busy),
            view: ModeView::for_option(state.swap_option, &self.addresses),
        }
    }

    /// Switch direction. Allowed while a submission is in flight; the
    /// in-flight request keeps the option it was built with.
    pub fn set_swap_option(&self, option: SwapOption) -> ModeView {
        let mut state = self.state();
        if state.swap_option != option {
            debug!(from = %state.swap_option, to = %option, "swap option changed");
        }
        state.swap_option = option;
        if state.phase != Phase::Submitting {
            state.phase = Phase::Idle;
        }
        ModeView::for_option(option, &self.addresses)
    }

    pub fn set_transaction_hash(&self, value: impl Into<String>) -> Result<(), FormError> {
        self.edit(|state| state.transaction_hash = value.into())
    }

    pub fn set_user_address(&self, value: impl Into<String>) -> Result<(), FormError> {
        self.edit(|state| state.user_address = value.into())
    }

    fn edit(&self, apply: impl FnOnce(&mut FormState)) -> Result<(), FormError> {
        let mut state = self.state();
        if self.is_busy() {
            return Err(FormError::Busy);
        }
        apply(&mut state);
        state.phase = Phase::Idle;
        Ok(())
    }

    /// Request wallet accounts and pre-fill the destination address with
    /// the first one.
    ///
    /// Returns `Ok(None)` when the wallet refuses, fails, or has no
    /// accounts; those cases are logged only.
    pub async fn connect(&self) -> Result<Option<String>, FormError> {
        let wallet = self.wallet.as_ref().ok_or(FormError::WalletUnavailable)?;

        let accounts = match wallet.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(error = %e, "error connecting wallet");
                return Ok(None);
            }
        };
        let Some(account) = accounts.into_iter().next() else {
            warn!("wallet returned no accounts");
            return Ok(None);
        };

        let mut state = self.state();
        state.account = Some(account.clone());
        if !self.is_busy() {
            state.user_address = account.clone();
        }
        info!(%account, "wallet connected");
        Ok(Some(account))
    }

    /// Validate the current inputs and perform one settlement call.
    ///
    /// Validation and busy rejections happen before any network call.
    /// Every other outcome, including transport failure, is reported
    /// through the returned [`Submission`] and the form status.
    pub async fn submit(&self) -> Result<Submission, FormError> {
        let (request, _in_flight) = {
            let mut state = self.state();
            let request = BridgeRequest::new(
                &state.transaction_hash,
                &state.user_address,
                state.swap_option,
            )?;
            let in_flight = self.claim(&mut state)?;
            (request, in_flight)
        };
        info!(
            tx = request.transaction_hash(),
            address = request.user_address(),
            option = %request.swap_option(),
            "submitting bridge request"
        );

        let submission = match self.service.bridge_swap(&request).await {
            Ok(response) => {
                let kind = if response.success {
                    StatusKind::Success
                } else {
                    StatusKind::Error
                };
                Submission {
                    status: Status::new(kind, response.status_text()),
                    response: Some(response),
                }
            }
            Err(e) => {
                error!(error = %e, "error submitting transaction");
                Submission {
                    status: Status::new(StatusKind::Error, FALLBACK_ERROR_TEXT),
                    response: None,
                }
            }
        };

        let mut state = self.state();
        state.phase = if submission.succeeded() {
            Phase::Success
        } else {
            Phase::Error
        };
        state.status = submission.status.clone();
        Ok(submission)
    }

    /// Claim the busy flag and enter `Submitting`. The caller holds the
    /// state lock.
    fn claim(&self, state: &mut FormState) -> Result<InFlight<'_>, FormError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("submit rejected: request already in flight");
            return Err(FormError::Busy);
        }
        state.phase = Phase::Submitting;
        state.status = Status::new(StatusKind::Neutral, PROCESSING_TEXT);
        Ok(InFlight { form: self })
    }
}
