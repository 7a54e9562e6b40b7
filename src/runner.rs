//! Serial execution of transaction batches
//!
//! Descriptors run strictly in order: a step is refreshed, bound to the live
//! quiz result, optionally preceded by a fee delegation, submitted with the
//! signer its descriptor names, and awaited to the configured depth before the
//! next step starts. The first failure aborts the rest of the batch; steps
//! that already confirmed stay on chain.

use crate::config::RunnerConfig;
use crate::error::OrchestrationError;
use crate::referral::{ReferralService, ReferralStatus};
use crate::signer::{TransactionSigner, TxReceipt, TxRequest};
use crate::state::RunStateHandle;
use crate::types::{
    Call, Delegation, FunctionId, RunContext, SignerRole, TxBatch, TxDescriptor,
};
use alloy::primitives::{Bytes, TxHash};
use eyre::{Context, Result};
use tracing::{debug, info, warn};

/// What happened to one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Confirmed {
        function: FunctionId,
        receipt: TxReceipt,
    },
    /// The refresher found the step redundant; nothing was submitted
    Skipped { function: FunctionId },
}

impl StepOutcome {
    pub fn function(&self) -> FunctionId {
        match self {
            Self::Confirmed { function, .. } | Self::Skipped { function } => *function,
        }
    }
}

/// The step that completed the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedStep {
    pub function: FunctionId,
    pub tx_hash: TxHash,
}

/// Result of the best-effort referral report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferralOutcome {
    /// No suffix was attached, or the batch never completed
    NotAttached,
    Submitted { status: ReferralStatus },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub steps: Vec<StepOutcome>,
    /// Set when the descriptor named by the batch's last step confirmed
    pub completed: Option<CompletedStep>,
    pub referral: ReferralOutcome,
}

/// Runs batches with a user signer, an admin signer and a referral service
pub struct TxRunner<U, A, F> {
    user: U,
    admin: A,
    referral: F,
    chain_id: u64,
    config: RunnerConfig,
}

impl<U, A, F> TxRunner<U, A, F>
where
    U: TransactionSigner,
    A: TransactionSigner,
    F: ReferralService,
{
    pub fn new(user: U, admin: A, referral: F, chain_id: u64, config: RunnerConfig) -> Self {
        Self {
            user,
            admin,
            referral,
            chain_id,
            config,
        }
    }

    pub fn user(&self) -> &U {
        &self.user
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Execute every descriptor of `batch` in order
    pub async fn run(
        &self,
        batch: &TxBatch,
        ctx: &RunContext,
        state: &RunStateHandle,
    ) -> Result<BatchOutcome> {
        let suffix = self.referral_suffix();
        let mut steps = Vec::with_capacity(batch.len());
        let mut completed = None;

        for (index, descriptor) in batch.descriptors.iter().enumerate() {
            let function = descriptor.function_id();
            let step = match self
                .run_step(descriptor, ctx, suffix.as_ref(), state)
                .await
            {
                Ok(step) => step,
                Err(err) => {
                    warn!(step = index, %function, error = %format!("{err:#}"), "batch aborted");
                    return Err(err);
                }
            };

            if let StepOutcome::Confirmed { receipt, .. } = &step {
                if completed.is_none() && function == batch.last_step {
                    completed = Some(CompletedStep {
                        function,
                        tx_hash: receipt.tx_hash,
                    });
                }
            }
            steps.push(step);
        }

        let referral = match (&completed, &suffix) {
            (Some(done), Some(_)) => self.report_referral(done.tx_hash, state).await,
            _ => ReferralOutcome::NotAttached,
        };

        Ok(BatchOutcome {
            steps,
            completed,
            referral,
        })
    }

    /// Attribution suffix for this chain, if any
    fn referral_suffix(&self) -> Option<Bytes> {
        if self.chain_id != self.config.primary_chain_id {
            return None;
        }
        let referral = self.config.referral.as_ref()?;
        match self
            .referral
            .data_suffix(referral.consumer, &referral.providers)
        {
            Ok(suffix) if !suffix.is_empty() => Some(suffix),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "referral suffix unavailable, continuing without attribution");
                None
            }
        }
    }

    async fn run_step(
        &self,
        descriptor: &TxDescriptor,
        ctx: &RunContext,
        suffix: Option<&Bytes>,
        state: &RunStateHandle,
    ) -> Result<StepOutcome> {
        let function = descriptor.function_id();

        let (call, value) = match descriptor.refresher() {
            Some(refresher) => {
                let refreshed = refresher
                    .refresh(&descriptor.call, descriptor.value)
                    .await
                    .with_context(|| format!("Failed to refresh {function} arguments"))?;
                if !refreshed.proceed {
                    info!(%function, "step no longer needed, skipping");
                    return Ok(StepOutcome::Skipped { function });
                }
                let refreshed_function = refreshed.call.function_id();
                eyre::ensure!(
                    refreshed_function == function,
                    "refresher for {function} returned a {refreshed_function} call"
                );
                (refreshed.call, refreshed.value)
            }
            None => (descriptor.call.clone(), descriptor.value),
        };
        // no fee moves without a quiz result
        let call = bind_quiz_result(call, ctx)?;

        if let Some(delegation) = descriptor.delegation {
            self.delegate(function, delegation, suffix, state).await?;
        }
        // the result may have changed while the delegation confirmed
        let call = bind_quiz_result(call, ctx)?;
        let suffix = suffix.map(|s| &s[..]).unwrap_or_default();
        let tx = TxRequest::new(descriptor.contract, call.encode())
            .with_value(value)
            .with_suffix(suffix);

        state.set_message(format!("Submitting {function}..."));
        let receipt = match descriptor.signer {
            SignerRole::User => self.submit_and_confirm(&self.user, function, tx, state).await?,
            SignerRole::Admin => self.submit_and_confirm(&self.admin, function, tx, state).await?,
        };

        Ok(StepOutcome::Confirmed { function, receipt })
    }

    /// Forward the admin's gas fee from the user's wallet and wait for it
    async fn delegate(
        &self,
        function: FunctionId,
        delegation: Delegation,
        suffix: Option<&Bytes>,
        state: &RunStateHandle,
    ) -> Result<()> {
        state.set_message("Forwarding network fee...");
        let suffix = suffix.map(|s| &s[..]).unwrap_or_default();
        let tx = TxRequest::transfer(delegation.to, delegation.amount).with_suffix(suffix);

        self.submit_and_confirm(&self.user, function, tx, state)
            .await
            .map_err(|err| OrchestrationError::Delegation {
                function,
                reason: format!("{err:#}"),
            })?;

        debug!(%function, to = %delegation.to, amount = %delegation.amount, "fee delegated");
        Ok(())
    }

    async fn submit_and_confirm<S: TransactionSigner>(
        &self,
        signer: &S,
        function: FunctionId,
        tx: TxRequest,
        state: &RunStateHandle,
    ) -> Result<TxReceipt> {
        let tx_hash = signer
            .sign_and_send(tx)
            .await
            .map_err(|err| OrchestrationError::Submission {
                function,
                reason: format!("{err:#}"),
            })?;
        info!(%function, %tx_hash, chain_id = self.chain_id, "transaction submitted");

        state.set_message(format!(
            "Waiting for {} confirmations...",
            self.config.confirmations
        ));
        let timeout = self.config.confirmation_timeout;
        let receipt = match tokio::time::timeout(
            timeout,
            signer.wait_for_receipt(tx_hash, self.config.confirmations),
        )
        .await
        {
            Ok(receipt) => receipt?,
            Err(_) => return Err(OrchestrationError::ConfirmationTimeout { tx_hash, timeout }.into()),
        };

        if !receipt.success {
            return Err(OrchestrationError::Reverted { function, tx_hash }.into());
        }

        info!(%function, %tx_hash, block = receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }

    async fn report_referral(&self, tx_hash: TxHash, state: &RunStateHandle) -> ReferralOutcome {
        match self.referral.submit_referral(tx_hash, self.chain_id).await {
            Ok(status) if status.is_success() => {
                info!(%tx_hash, "referral submitted");
                ReferralOutcome::Submitted { status }
            }
            Ok(status) => {
                let reason = format!("attribution service returned {}", status.code);
                warn!(%tx_hash, %reason, "referral not recorded");
                state.set_message(format!("Referral not recorded: {reason}"));
                ReferralOutcome::Failed { reason }
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(%tx_hash, %reason, "referral not recorded");
                state.set_message(format!("Referral not recorded: {reason}"));
                ReferralOutcome::Failed { reason }
            }
        }
    }
}

/// Overwrite `recordPoints` with the caller's current quiz result
fn bind_quiz_result(call: Call, ctx: &RunContext) -> Result<Call> {
    match call {
        Call::RecordPoints {
            user,
            campaign_hash,
            ..
        } => {
            let points = ctx
                .current_points()
                .ok_or(OrchestrationError::MissingQuizResult)?;
            Ok(Call::RecordPoints {
                user,
                points,
                campaign_hash,
            })
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SetUpCampaignParams;
    use crate::config::ReferralConfig;
    use crate::constants::{CELO_MAINNET_CHAIN_ID, CELO_TESTNET_CHAIN_ID, DEFAULT_DELEGATION_FEE};
    use crate::contracts::{IERC20, ILearna};
    use crate::referral::SUFFIX_MARKER;
    use crate::testing::*;
    use crate::types::{ArgRefresher, Refreshed};
    use alloy::primitives::{Address, B256, U256};
    use alloy::sol_types::SolCall;
    use futures::future::BoxFuture;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    type Runner = TxRunner<MockSigner, MockSigner, MockReferral>;

    fn runner_on(chain_id: u64, user: MockSigner, admin: MockSigner, referral: MockReferral) -> Runner {
        let config = RunnerConfig::default().with_referral(ReferralConfig {
            consumer: Address::repeat_byte(0xc0),
            providers: vec![Address::repeat_byte(0xa1)],
        });
        TxRunner::new(user, admin, referral, chain_id, config)
    }

    fn testnet_runner(journal: &Journal) -> Runner {
        runner_on(
            CELO_TESTNET_CHAIN_ID,
            MockSigner::user(journal),
            MockSigner::admin(journal),
            MockReferral::new(200),
        )
    }

    fn token_campaign() -> SetUpCampaignParams {
        SetUpCampaignParams::new(B256::repeat_byte(7)).with_token_funding(U256::from(500u64))
    }

    fn selector_of(data: &[u8]) -> [u8; 4] {
        [data[0], data[1], data[2], data[3]]
    }

    #[tokio::test]
    async fn test_steps_run_in_order() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let batch = testnet_builder().set_up_campaign(&token_campaign()).unwrap();

        let outcome = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap();

        let events = journal.events();
        assert_eq!(events.len(), 4);
        let selectors: Vec<_> = journal
            .sent()
            .iter()
            .map(|(_, _, _, data)| selector_of(data))
            .collect();
        assert_eq!(
            selectors,
            vec![
                IERC20::approveCall::SELECTOR,
                ILearna::setUpCampaignCall::SELECTOR
            ]
        );
        // each send is confirmed before the next one goes out
        assert!(matches!(events[0], Event::Sent { .. }));
        assert!(matches!(events[1], Event::Confirmed { confirmations: 2, .. }));
        assert!(matches!(events[2], Event::Sent { .. }));
        assert!(matches!(events[3], Event::Confirmed { .. }));

        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(
            outcome.completed.map(|done| done.function),
            Some(FunctionId::SetUpCampaign)
        );
        assert_eq!(outcome.referral, ReferralOutcome::NotAttached);
    }

    #[tokio::test]
    async fn test_failed_approve_never_submits_setup() {
        let journal = Journal::default();
        let runner = runner_on(
            CELO_TESTNET_CHAIN_ID,
            MockSigner::user(&journal).failing_on(IERC20::approveCall::SELECTOR),
            MockSigner::admin(&journal),
            MockReferral::new(200),
        );
        let batch = testnet_builder().set_up_campaign(&token_campaign()).unwrap();

        let err = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrchestrationError>(),
            Some(OrchestrationError::Submission {
                function: FunctionId::Approve,
                ..
            })
        ));
        assert!(journal.events().is_empty());
    }

    #[tokio::test]
    async fn test_record_points_uses_live_quiz_result() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let (points_tx, points_rx) = watch::channel(3u32);
        let batch = testnet_builder()
            .record_points(USER, B256::repeat_byte(1))
            .unwrap();

        // the quiz finishes after the batch was built
        points_tx.send(87).unwrap();
        let ctx = RunContext::default().with_quiz_points(points_rx);
        runner.run(&batch, &ctx, &RunStateHandle::new()).await.unwrap();

        let sent = journal.sent();
        assert_eq!(sent.len(), 2);

        let (signer, to, value, data) = &sent[0];
        assert_eq!(*signer, "user");
        assert_eq!(*to, ADMIN);
        assert_eq!(*value, U256::from(DEFAULT_DELEGATION_FEE));
        assert!(data.is_empty());

        let (signer, to, _, data) = &sent[1];
        assert_eq!(*signer, "admin");
        assert_eq!(*to, TEST_LEARNA);
        let decoded = ILearna::recordPointsCall::abi_decode(data).unwrap();
        assert_eq!(decoded.points, 87);

        // delegation confirmed before the admin submits
        assert!(matches!(
            journal.events()[1],
            Event::Confirmed { signer: "user", .. }
        ));
    }

    #[tokio::test]
    async fn test_record_points_reads_result_after_delegation() {
        let journal = Journal::default();
        let (points_tx, points_rx) = watch::channel(3u32);
        let runner = runner_on(
            CELO_TESTNET_CHAIN_ID,
            MockSigner::user(&journal).updating_points_on_confirm(points_tx, 99),
            MockSigner::admin(&journal),
            MockReferral::new(200),
        );
        let batch = testnet_builder()
            .record_points(USER, B256::repeat_byte(1))
            .unwrap();

        let ctx = RunContext::default().with_quiz_points(points_rx);
        runner.run(&batch, &ctx, &RunStateHandle::new()).await.unwrap();

        let sent = journal.sent();
        assert_eq!(sent.len(), 2);
        let (signer, _, _, data) = &sent[1];
        assert_eq!(*signer, "admin");
        let decoded = ILearna::recordPointsCall::abi_decode(data).unwrap();
        assert_eq!(decoded.points, 99);
    }

    #[tokio::test]
    async fn test_run_all_submits_exactly_two_calls() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let (_points_tx, points_rx) = watch::channel(10u32);
        let batch = testnet_builder()
            .run_all(USER, B256::repeat_byte(1), U256::from(1_000u64))
            .unwrap();

        let outcome = runner
            .run(
                &batch,
                &RunContext::default().with_quiz_points(points_rx),
                &RunStateHandle::new(),
            )
            .await
            .unwrap();

        let events = journal.events();
        assert_eq!(events.len(), 4);
        match (&events[0], &events[2]) {
            (
                Event::Sent {
                    signer: "user",
                    data: first,
                    value,
                    ..
                },
                Event::Sent {
                    signer: "admin",
                    data: second,
                    ..
                },
            ) => {
                assert_eq!(selector_of(first), ILearna::generateKeyCall::SELECTOR);
                assert_eq!(*value, U256::from(1_000u64));
                assert_eq!(selector_of(second), ILearna::recordPointsCall::SELECTOR);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(matches!(events[1], Event::Confirmed { signer: "user", .. }));
        assert!(matches!(events[3], Event::Confirmed { signer: "admin", .. }));
        assert_eq!(
            outcome.completed.map(|done| done.function),
            Some(FunctionId::RecordPoints)
        );
    }

    #[tokio::test]
    async fn test_failed_delegation_skips_record_points() {
        let journal = Journal::default();
        let runner = runner_on(
            CELO_TESTNET_CHAIN_ID,
            MockSigner::user(&journal).failing_transfers(),
            MockSigner::admin(&journal),
            MockReferral::new(200),
        );
        let (_points_tx, points_rx) = watch::channel(5u32);
        let batch = testnet_builder().record_points(USER, B256::ZERO).unwrap();

        let err = runner
            .run(
                &batch,
                &RunContext::default().with_quiz_points(points_rx),
                &RunStateHandle::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrchestrationError>(),
            Some(OrchestrationError::Delegation {
                function: FunctionId::RecordPoints,
                ..
            })
        ));
        assert!(journal.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_quiz_result_is_an_error() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let batch = testnet_builder().record_points(USER, B256::ZERO).unwrap();

        let err = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrchestrationError>(),
            Some(OrchestrationError::MissingQuizResult)
        ));
        assert!(journal.events().is_empty());
    }

    #[tokio::test]
    async fn test_suffix_attached_and_referral_submitted_on_primary_chain() {
        let journal = Journal::default();
        let referral = MockReferral::new(200);
        let submitted = referral.submitted.clone();
        let runner = runner_on(
            CELO_MAINNET_CHAIN_ID,
            MockSigner::user(&journal),
            MockSigner::admin(&journal),
            referral,
        );
        let batch = mainnet_builder().set_up_campaign(&token_campaign()).unwrap();

        let outcome = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap();

        for (_, _, _, data) in journal.sent() {
            assert!(data.ends_with(&SUFFIX_MARKER));
        }
        let done = outcome.completed.unwrap();
        assert_eq!(
            submitted.lock().unwrap().clone(),
            vec![(done.tx_hash, CELO_MAINNET_CHAIN_ID)]
        );
        assert_eq!(
            outcome.referral,
            ReferralOutcome::Submitted {
                status: ReferralStatus { code: 200 }
            }
        );
    }

    #[tokio::test]
    async fn test_no_suffix_off_primary_chain() {
        let journal = Journal::default();
        let referral = MockReferral::new(200);
        let submitted = referral.submitted.clone();
        let runner = runner_on(
            CELO_TESTNET_CHAIN_ID,
            MockSigner::user(&journal),
            MockSigner::admin(&journal),
            referral,
        );
        let batch = testnet_builder()
            .claim_reward(USER, B256::ZERO, 2)
            .unwrap();

        runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap();

        let (_, _, _, data) = &journal.sent()[0];
        let expected = batch.descriptors[0].call.encode();
        assert_eq!(data, &expected);
        assert!(submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_referral_failure_does_not_fail_batch() {
        for referral in [MockReferral::new(500), MockReferral::unreachable()] {
            let journal = Journal::default();
            let runner = runner_on(
                CELO_MAINNET_CHAIN_ID,
                MockSigner::user(&journal),
                MockSigner::admin(&journal),
                referral,
            );
            let batch = mainnet_builder().tip(U256::from(1u64)).unwrap();
            let state = RunStateHandle::new();

            let outcome = runner
                .run(&batch, &RunContext::default(), &state)
                .await
                .unwrap();

            assert!(outcome.completed.is_some());
            assert!(matches!(outcome.referral, ReferralOutcome::Failed { .. }));
            assert!(state
                .get()
                .message
                .unwrap()
                .starts_with("Referral not recorded"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_wait_is_bounded() {
        let journal = Journal::default();
        let runner = TxRunner::new(
            MockSigner::user(&journal).hanging(),
            MockSigner::admin(&journal),
            MockReferral::new(200),
            CELO_TESTNET_CHAIN_ID,
            RunnerConfig::default().with_confirmation_timeout(Duration::from_secs(30)),
        );
        let batch = testnet_builder().tip(U256::from(1u64)).unwrap();

        let err = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrchestrationError>(),
            Some(OrchestrationError::ConfirmationTimeout { timeout, .. }) if *timeout == Duration::from_secs(30)
        ));
    }

    #[tokio::test]
    async fn test_reverted_step_fails_batch() {
        let journal = Journal::default();
        let runner = runner_on(
            CELO_TESTNET_CHAIN_ID,
            MockSigner::user(&journal).reverting_on(ILearna::claimRewardCall::SELECTOR),
            MockSigner::admin(&journal),
            MockReferral::new(200),
        );
        let batch = testnet_builder()
            .claim_reward(USER, B256::ZERO, 2)
            .unwrap();

        let err = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrchestrationError>(),
            Some(OrchestrationError::Reverted {
                function: FunctionId::ClaimReward,
                ..
            })
        ));
    }

    struct AlreadyHeld;

    impl ArgRefresher for AlreadyHeld {
        fn refresh<'a>(&'a self, call: &'a Call, value: U256) -> BoxFuture<'a, Result<Refreshed>> {
            Box::pin(async move { Ok(Refreshed::skip(call.clone(), value)) })
        }
    }

    #[tokio::test]
    async fn test_refresher_can_skip_a_step() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let (_points_tx, points_rx) = watch::channel(1u32);
        let mut batch = testnet_builder()
            .run_all(USER, B256::ZERO, U256::from(1u64))
            .unwrap();
        batch.descriptors[0] = batch.descriptors[0].clone().with_refresher(Arc::new(AlreadyHeld));

        let outcome = runner
            .run(
                &batch,
                &RunContext::default().with_quiz_points(points_rx),
                &RunStateHandle::new(),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome.steps[0],
            StepOutcome::Skipped {
                function: FunctionId::GenerateKey
            }
        );
        assert_eq!(journal.sent().len(), 1);
        assert!(outcome.completed.is_some());
    }

    #[tokio::test]
    async fn test_skipped_last_step_does_not_complete() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let mut batch = testnet_builder()
            .generate_key(USER, B256::ZERO, U256::ZERO)
            .unwrap();
        batch.descriptors[0] = batch.descriptors[0].clone().with_refresher(Arc::new(AlreadyHeld));

        let outcome = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap();

        assert!(outcome.completed.is_none());
        assert!(journal.events().is_empty());
    }

    struct SwapsFunction;

    impl ArgRefresher for SwapsFunction {
        fn refresh<'a>(&'a self, _call: &'a Call, value: U256) -> BoxFuture<'a, Result<Refreshed>> {
            Box::pin(async move { Ok(Refreshed::proceed(Call::Tip, value)) })
        }
    }

    #[tokio::test]
    async fn test_refresher_cannot_change_function() {
        let journal = Journal::default();
        let runner = testnet_runner(&journal);
        let mut batch = testnet_builder()
            .claim_reward(USER, B256::ZERO, 2)
            .unwrap();
        batch.descriptors[0] = batch.descriptors[0]
            .clone()
            .with_refresher(Arc::new(SwapsFunction));

        let err = runner
            .run(&batch, &RunContext::default(), &RunStateHandle::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("returned a tip call"));
        assert!(journal.events().is_empty());
    }
}
