//! Borrow orchestration against the Vale lending contracts.
//!
//! The heart of this crate is [`BorrowFlow`]: the state machine that turns
//! a user-entered validator id into a safely ordered sequence of on-chain
//! operations (ownership check, conditional approval, loan submission,
//! confirmation), with every failure normalized at the gateway boundary
//! and classified into a closed taxonomy before it surfaces.
//!
//! The secondary, off-chain registration flow lives in [`registry`] and
//! shares nothing with the on-chain path except validator-id parsing.

pub mod classify;
pub mod flow;
pub mod gateway;
pub mod registry;

pub use classify::{ErrorCategory, classify};
pub use flow::{
    BorrowFlow, BorrowFlowBusy, BorrowOutcome, BorrowRequest, BorrowStep, InvalidTokenId,
    parse_token_id,
};
pub use gateway::{EthGateway, GatewayError, LendingGateway, PendingTx, TxOutcome};
pub use registry::{RegistrationClient, RegistrationError};
