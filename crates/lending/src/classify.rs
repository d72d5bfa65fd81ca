//! The closed failure taxonomy surfaced to users.

use std::fmt;

use crate::{flow::BorrowStep, gateway::GatewayError};

/// Every borrow failure maps to exactly one of these before surfacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    NoWalletAvailable,
    UserRejected,
    NotOwnerOrNotFound,
    ApprovalFailed,
    BorrowFailed,
    NetworkOrRpcError,
    InvalidInput,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoWalletAvailable => "no wallet available",
            Self::UserRejected => "user rejected",
            Self::NotOwnerOrNotFound => "not owner or token not found",
            Self::ApprovalFailed => "approval failed",
            Self::BorrowFailed => "borrow failed",
            Self::NetworkOrRpcError => "network or rpc error",
            Self::InvalidInput => "invalid input",
            Self::Unknown => "unknown error",
        })
    }
}

/// Maps a normalized gateway failure at a given step to its category and
/// user-facing message.
///
/// Inspects, in order: the structured revert reason (surfaced verbatim),
/// then the user-rejection signal, then falls back with the raw message
/// preserved. Never fails.
pub fn classify(step: BorrowStep, err: &GatewayError) -> (ErrorCategory, String) {
    match err {
        GatewayError::Revert { reason } => {
            let category = match step {
                BorrowStep::CheckingOwnership | BorrowStep::CheckingApproval => {
                    ErrorCategory::NotOwnerOrNotFound
                }
                BorrowStep::ApprovalPending | BorrowStep::ApprovalConfirmed => {
                    ErrorCategory::ApprovalFailed
                }
                BorrowStep::SubmittingBorrow | BorrowStep::AwaitingBorrowConfirmation => {
                    ErrorCategory::BorrowFailed
                }
                _ => ErrorCategory::Unknown,
            };
            let message = match reason {
                Some(reason) => reason.clone(),
                None => err.to_string(),
            };
            (category, message)
        }
        GatewayError::Rejected => (ErrorCategory::UserRejected, err.to_string()),
        GatewayError::Rpc(message) => (ErrorCategory::NetworkOrRpcError, message.clone()),
    }
}
