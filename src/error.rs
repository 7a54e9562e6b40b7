//! Error types for the Learna SDK
//!
//! Uses `eyre` for ergonomic error handling with context. Failures that callers
//! need to branch on are raised as [`OrchestrationError`] inside the report and
//! recovered with `Report::downcast_ref`.

pub use eyre::{eyre, Context, Report, Result};

use crate::types::FunctionId;
use alloy::primitives::TxHash;
use std::time::Duration;

/// Typed failures of batch construction and execution
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// The registry has no entry for this function on the active chain
    #[error("function {function} not supported on chain {chain_id}")]
    FunctionNotSupported { function: FunctionId, chain_id: u64 },

    /// Signing or broadcasting a step failed
    #[error("failed to submit {function}: {reason}")]
    Submission { function: FunctionId, reason: String },

    /// The fee transfer to the admin signer failed, so the step was not attempted
    #[error("fee delegation for {function} failed: {reason}")]
    Delegation { function: FunctionId, reason: String },

    /// The receipt did not reach the required depth in time
    #[error("{tx_hash} not confirmed within {timeout:?}")]
    ConfirmationTimeout { tx_hash: TxHash, timeout: Duration },

    /// The transaction was mined but reverted
    #[error("{function} reverted in {tx_hash}")]
    Reverted { function: FunctionId, tx_hash: TxHash },

    /// Another batch currently owns the run state
    #[error("another transaction batch is already running")]
    BatchInProgress,

    /// `recordPoints` was submitted without a live quiz result
    #[error("no quiz result available for recordPoints")]
    MissingQuizResult,
}
