//! The borrow transaction orchestrator.
//!
//! One [`BorrowFlow`] per wallet session drives one [`BorrowRequest`] at a
//! time through a strictly ordered sequence: validate input, verify
//! ownership, check (and only if needed, set) the token approval, submit
//! the borrow, and wait for its receipt. Progress is observable as data;
//! nothing here prints.
//!
//! No step is ever retried automatically. Broadcast transactions are not
//! safely idempotent to repeat, so every retry is a fresh user submission.

use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use alloy_primitives::{Address, TxHash, U256};
use tracing::{debug, trace};

use crate::{
    classify::{ErrorCategory, classify},
    gateway::{GatewayError, LendingGateway},
};

/// Position of a [`BorrowRequest`] in the orchestration state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorrowStep {
    Idle,
    ValidatingInput,
    CheckingOwnership,
    CheckingApproval,
    ApprovalPending,
    ApprovalConfirmed,
    SubmittingBorrow,
    AwaitingBorrowConfirmation,
    Succeeded,
    Failed,
}

impl BorrowStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for BorrowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::ValidatingInput => "validating input",
            Self::CheckingOwnership => "checking ownership",
            Self::CheckingApproval => "checking approval",
            Self::ApprovalPending => "approval pending",
            Self::ApprovalConfirmed => "approval confirmed",
            Self::SubmittingBorrow => "submitting borrow",
            Self::AwaitingBorrowConfirmation => "awaiting borrow confirmation",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

/// Terminal outcome of one borrow orchestration run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BorrowOutcome {
    Succeeded { tx_hash: TxHash },
    Failed { category: ErrorCategory, message: String },
}

/// Parse failure of a user-entered validator id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTokenId {
    #[error("validator id must not be empty")]
    Empty,
    #[error("validator id must not be negative")]
    Negative,
    #[error("validator id must be a decimal integer")]
    NotNumeric,
}

/// Parses a user-entered validator id. Runs before any network access.
pub fn parse_token_id(input: &str) -> Result<U256, InvalidTokenId> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InvalidTokenId::Empty);
    }
    if let Some(rest) = input.strip_prefix('-') {
        if !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTokenId::Negative);
        }
        return Err(InvalidTokenId::NotNumeric);
    }
    U256::from_str_radix(input, 10).map_err(|_| InvalidTokenId::NotNumeric)
}

/// One user-initiated borrow orchestration, observable as data: the
/// current step, the hashes of submitted transactions, and the terminal
/// result. Discarded once terminal; a new submission builds a fresh one.
#[derive(Clone, Debug)]
pub struct BorrowRequest {
    token_id: Option<U256>,
    step: BorrowStep,
    tx_hashes: Vec<(BorrowStep, TxHash)>,
    result: Option<BorrowOutcome>,
}

impl BorrowRequest {
    fn new() -> Self {
        Self { token_id: None, step: BorrowStep::Idle, tx_hashes: Vec::new(), result: None }
    }

    /// The parsed validator id; `None` if validation rejected the input.
    pub fn token_id(&self) -> Option<U256> {
        self.token_id
    }

    pub fn step(&self) -> BorrowStep {
        self.step
    }

    /// Hashes of submitted transactions, in submission order. Append-only.
    pub fn tx_hashes(&self) -> &[(BorrowStep, TxHash)] {
        &self.tx_hashes
    }

    pub fn result(&self) -> Option<&BorrowOutcome> {
        self.result.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.step.is_terminal()
    }

    fn advance(&mut self, step: BorrowStep) {
        trace!(target: "vale::flow", from = %self.step, to = %step, "step");
        self.step = step;
    }

    fn record_tx(&mut self, step: BorrowStep, hash: TxHash) {
        self.tx_hashes.push((step, hash));
    }

    fn fail(&mut self, category: ErrorCategory, message: impl Into<String>) {
        let message = message.into();
        debug!(target: "vale::flow", %category, %message, "borrow failed");
        self.advance(BorrowStep::Failed);
        self.result = Some(BorrowOutcome::Failed { category, message });
    }

    fn fail_with(&mut self, err: &GatewayError) {
        let (category, message) = classify(self.step, err);
        self.fail(category, message);
    }

    fn succeed(&mut self, tx_hash: TxHash) {
        debug!(target: "vale::flow", %tx_hash, "borrow succeeded");
        self.advance(BorrowStep::Succeeded);
        self.result = Some(BorrowOutcome::Succeeded { tx_hash });
    }
}

/// Rejection of a submission made while another request is in flight.
///
/// This is a synchronous guard, not a terminal orchestration failure: no
/// [`BorrowRequest`] is created for the rejected submission, and nothing
/// is queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("a borrow request is already in flight for this session")]
pub struct BorrowFlowBusy;

/// Drives one borrow request at a time through the gateway.
pub struct BorrowFlow<G> {
    gateway: G,
    borrower: Address,
    in_flight: AtomicBool,
}

impl<G: LendingGateway> BorrowFlow<G> {
    /// `borrower` is the session's connected address; the ownership check
    /// and the borrow call both use it.
    pub fn new(gateway: G, borrower: Address) -> Self {
        Self { gateway, borrower, in_flight: AtomicBool::new(false) }
    }

    /// Runs one borrow orchestration to its terminal state.
    ///
    /// While another request is non-terminal, rejects synchronously with
    /// [`BorrowFlowBusy`] before touching the input or the network.
    pub async fn run(&self, input: &str) -> Result<BorrowRequest, BorrowFlowBusy> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BorrowFlowBusy);
        }
        let _guard = InFlight(&self.in_flight);
        Ok(self.drive(input).await)
    }

    async fn drive(&self, input: &str) -> BorrowRequest {
        let mut req = BorrowRequest::new();

        req.advance(BorrowStep::ValidatingInput);
        let token_id = match parse_token_id(input) {
            Ok(id) => id,
            Err(err) => {
                req.fail(ErrorCategory::InvalidInput, err.to_string());
                return req;
            }
        };
        req.token_id = Some(token_id);

        // Ownership comes first: a borrow for a token the account does not
        // own is a guaranteed revert, checked here without spending gas.
        req.advance(BorrowStep::CheckingOwnership);
        match self.gateway.owner_of(token_id).await {
            Ok(owner) if owner == self.borrower => {}
            Ok(owner) => {
                req.fail(
                    ErrorCategory::NotOwnerOrNotFound,
                    format!("validator {token_id} is owned by {owner}, not the connected account"),
                );
                return req;
            }
            Err(err) => {
                req.fail_with(&err);
                return req;
            }
        }

        req.advance(BorrowStep::CheckingApproval);
        let pool = self.gateway.lending_pool();
        let approved = match self.gateway.get_approved(token_id).await {
            Ok(approved) => approved,
            Err(err) => {
                req.fail_with(&err);
                return req;
            }
        };

        if approved == pool {
            // Approval state is idempotent; never re-submit when already
            // correct.
            trace!(target: "vale::flow", %pool, "lending pool already approved, skipping approval");
        } else {
            req.advance(BorrowStep::ApprovalPending);
            let pending = match self.gateway.approve(pool, token_id).await {
                Ok(pending) => pending,
                Err(err) => {
                    req.fail_with(&err);
                    return req;
                }
            };
            req.record_tx(BorrowStep::ApprovalPending, pending.hash);
            match self.gateway.confirm(&pending).await {
                Ok(outcome) if outcome.success => req.advance(BorrowStep::ApprovalConfirmed),
                Ok(outcome) => {
                    // Mined but failed: no error was thrown, the receipt
                    // status alone decides.
                    req.fail(
                        ErrorCategory::ApprovalFailed,
                        format!("approval transaction {} reverted on chain", outcome.hash),
                    );
                    return req;
                }
                Err(err) => {
                    req.fail_with(&err);
                    return req;
                }
            }
        }

        req.advance(BorrowStep::SubmittingBorrow);
        let pending = match self.gateway.borrow(token_id, self.borrower).await {
            Ok(pending) => pending,
            Err(err) => {
                req.fail_with(&err);
                return req;
            }
        };
        req.record_tx(BorrowStep::SubmittingBorrow, pending.hash);

        req.advance(BorrowStep::AwaitingBorrowConfirmation);
        match self.gateway.confirm(&pending).await {
            Ok(outcome) if outcome.success => req.succeed(outcome.hash),
            Ok(outcome) => req.fail(
                ErrorCategory::BorrowFailed,
                format!("borrow transaction {} reverted on chain", outcome.hash),
            ),
            Err(err) => req.fail_with(&err),
        }
        req
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
