//! Wallet session management.
//!
//! A [`WalletSession`] owns the lifecycle of the connection to the user's
//! signing agent: it requests account access, tracks the connection state,
//! and hands out the signing capability to the transaction layer. The agent
//! itself is abstracted behind [`SigningAgent`] so the session logic is
//! independent of where keys actually live.

mod agent;
mod error;
mod session;

pub use agent::{LocalAgent, SigningAgent};
pub use error::{AgentError, SessionError};
pub use session::{SessionStatus, WalletSession};
