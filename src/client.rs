//! LearnaClient - main entry point for the SDK

use crate::builder::{SetUpCampaignParams, SortWeeklyRewardParams, TxBuilder};
use crate::broadcast::SocialBroadcaster;
use crate::coordinator::CompletionCoordinator;
use crate::error::OrchestrationError;
use crate::reader::StateReader;
use crate::referral::ReferralService;
use crate::runner::{BatchOutcome, TxRunner};
use crate::signer::TransactionSigner;
use crate::state::{RunState, RunStateHandle};
use crate::types::{RunContext, TxBatch};
use alloy::primitives::{Address, B256, U256};
use eyre::Result;
use tokio::sync::{watch, Mutex};
use tracing::info;

/// Builds, runs and settles Learna transaction batches
///
/// One batch runs at a time; a second `execute` while one is in flight fails
/// with [`OrchestrationError::BatchInProgress`].
pub struct LearnaClient<U, A, F, R, B> {
    builder: TxBuilder,
    runner: TxRunner<U, A, F>,
    coordinator: CompletionCoordinator<R, B>,
    state: RunStateHandle,
    active: Mutex<()>,
}

impl<U, A, F, R, B> LearnaClient<U, A, F, R, B>
where
    U: TransactionSigner,
    A: TransactionSigner,
    F: ReferralService,
    R: StateReader,
    B: SocialBroadcaster,
{
    pub fn new(
        builder: TxBuilder,
        runner: TxRunner<U, A, F>,
        coordinator: CompletionCoordinator<R, B>,
    ) -> Self {
        Self {
            builder,
            runner,
            coordinator,
            state: RunStateHandle::new(),
            active: Mutex::new(()),
        }
    }

    /// Get the connected user's address
    pub fn address(&self) -> Address {
        self.runner.user().address()
    }

    pub fn builder(&self) -> &TxBuilder {
        &self.builder
    }

    pub fn state(&self) -> &RunStateHandle {
        &self.state
    }

    /// Follow run-state updates
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Cancel a pending teardown, e.g. when the consuming view goes away
    pub fn cancel_pending(&self) {
        self.coordinator.cancel_pending();
    }

    /// Run a batch and settle its run state
    pub async fn execute(&self, batch: TxBatch, ctx: RunContext) -> Result<BatchOutcome> {
        let _guard = self
            .active
            .try_lock()
            .map_err(|_| OrchestrationError::BatchInProgress)?;

        self.coordinator.cancel_pending();
        self.state.begin(batch.last_step);
        info!(action = %batch.action, steps = batch.len(), "starting batch");

        match self.runner.run(&batch, &ctx, &self.state).await {
            Ok(outcome) => {
                self.coordinator
                    .complete(&batch, &outcome, &self.state)
                    .await;
                Ok(outcome)
            }
            Err(err) => {
                self.coordinator.fail(&self.state, &err);
                Err(err)
            }
        }
    }

    // ========== Feature Operations ==========

    /// Approve the Learna contract to pull campaign tokens
    pub async fn approve(&self, spender: Address, amount: U256) -> Result<BatchOutcome> {
        let batch = self.builder.approve(spender, amount)?;
        self.execute(batch, RunContext::default()).await
    }

    /// Create and fund a campaign
    pub async fn set_up_campaign(&self, params: &SetUpCampaignParams) -> Result<BatchOutcome> {
        let batch = self.builder.set_up_campaign(params)?;
        self.execute(batch, RunContext::default()).await
    }

    /// Mint a pass key for the connected user
    pub async fn generate_key(&self, campaign_hash: B256, fee: U256) -> Result<BatchOutcome> {
        let batch = self
            .builder
            .generate_key(self.address(), campaign_hash, fee)?;
        self.execute(batch, RunContext::default()).await
    }

    /// Record the user's quiz result via the admin key
    pub async fn record_points(
        &self,
        campaign_hash: B256,
        quiz_points: watch::Receiver<u32>,
    ) -> Result<BatchOutcome> {
        let batch = self.builder.record_points(self.address(), campaign_hash)?;
        self.execute(batch, RunContext::default().with_quiz_points(quiz_points))
            .await
    }

    /// Generate a key and record the quiz result in one action
    pub async fn run_all(
        &self,
        campaign_hash: B256,
        fee: U256,
        quiz_points: watch::Receiver<u32>,
    ) -> Result<BatchOutcome> {
        let batch = self.builder.run_all(self.address(), campaign_hash, fee)?;
        self.execute(batch, RunContext::default().with_quiz_points(quiz_points))
            .await
    }

    /// Claim the connected user's reward for a closed week
    pub async fn claim_reward(&self, campaign_hash: B256, week_id: u64) -> Result<BatchOutcome> {
        let batch = self
            .builder
            .claim_reward(self.address(), campaign_hash, week_id)?;
        self.execute(batch, RunContext::default()).await
    }

    /// Close the current week and sort its rewards
    pub async fn sort_weekly_reward(&self, params: SortWeeklyRewardParams) -> Result<BatchOutcome> {
        let batch = self.builder.sort_weekly_reward(params)?;
        self.execute(batch, RunContext::default()).await
    }

    /// Tip the platform
    pub async fn tip(&self, amount: U256) -> Result<BatchOutcome> {
        let batch = self.builder.tip(amount)?;
        self.execute(batch, RunContext::default()).await
    }
}
