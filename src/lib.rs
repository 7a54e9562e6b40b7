//! Learna SDK for Rust
//!
//! Transaction orchestration for Learna learn-to-earn quiz campaigns on Celo.
//!
//! # Features
//!
//! - Build transaction batches per feature (campaign setup, pass keys, quiz
//!   points, reward claims, weekly reward sorting, tips)
//! - Run batches serially with a user wallet and a server-held admin key,
//!   waiting for confirmations between steps
//! - Attach referral attribution on Celo mainnet and report confirmed hashes
//! - Settle run state: refetch, social broadcasts, delayed teardown
//!
//! # Example
//!
//! ```rust,ignore
//! use learna_sdk::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> eyre::Result<()> {
//!     let network = NetworkConfig::from_env()?;
//!     let user = LocalSigner::from_env("USER_PRIVATE_KEY", &network.rpc_url).await?;
//!     let admin = LocalSigner::from_env("ADMIN_PRIVATE_KEY", &network.rpc_url).await?;
//!
//!     let registry = Arc::new(Registry::from_networks(&[network.clone()]));
//!     let builder = TxBuilder::new(registry, network.chain_id, admin.address());
//!     let runner = TxRunner::new(user, admin, DivviClient::new()?, network.chain_id, RunnerConfig::default());
//!     let coordinator = CompletionCoordinator::new(
//!         LearnaReader::new(&network)?,
//!         NeynarClient::from_env()?,
//!         CoordinatorConfig::default(),
//!     );
//!     let client = LearnaClient::new(builder, runner, coordinator);
//!
//!     client.claim_reward(campaign_hash, 3).await?;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod builder;
pub mod client;
pub mod config;
pub mod constants;
pub mod contracts;
pub mod coordinator;
pub mod error;
pub mod reader;
pub mod referral;
pub mod registry;
pub mod runner;
pub mod signer;
pub mod state;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use broadcast::{NeynarClient, SocialBroadcaster};
pub use builder::{SetUpCampaignParams, SortWeeklyRewardParams, TxBuilder};
pub use client::LearnaClient;
pub use config::{CoordinatorConfig, NetworkConfig, ReferralConfig, RunnerConfig};
pub use coordinator::{Completion, CompletionCoordinator};
pub use error::{eyre, Context, OrchestrationError, Report, Result};
pub use reader::{AllowanceCheck, LearnaReader, PassKeyCheck, ReadSnapshot, StateReader};
pub use referral::{DivviClient, ReferralService, ReferralStatus};
pub use registry::{FunctionEntry, Registry};
pub use runner::{BatchOutcome, CompletedStep, ReferralOutcome, StepOutcome, TxRunner};
pub use signer::{LocalSigner, TransactionSigner, TxReceipt, TxRequest};
pub use state::{Destination, RunState, RunStateHandle};
pub use types::{
    ArgRefresher, Call, Delegation, FunctionId, Refreshed, RunContext, SignerRole, TxBatch,
    TxDescriptor,
};
