//! Completion side effects and run-state teardown

use crate::broadcast::{templates, SocialBroadcaster};
use crate::config::CoordinatorConfig;
use crate::constants::SUPPORT_MESSAGE;
use crate::reader::{ReadSnapshot, StateReader};
use crate::runner::{BatchOutcome, ReferralOutcome};
use crate::state::{Destination, RunStateHandle};
use crate::types::{FunctionId, TxBatch};
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What the coordinator did for a completed batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub snapshot: Option<ReadSnapshot>,
    /// Hashes of the broadcasts that were published
    pub broadcasts: Vec<String>,
    pub destination: Destination,
}

pub struct CompletionCoordinator<R, B> {
    reader: R,
    broadcaster: B,
    config: CoordinatorConfig,
    /// Teardown timer of the most recent batch
    pending: Mutex<Option<CancellationToken>>,
}

impl<R, B> CompletionCoordinator<R, B>
where
    R: StateReader,
    B: SocialBroadcaster,
{
    pub fn new(reader: R, broadcaster: B, config: CoordinatorConfig) -> Self {
        Self {
            reader,
            broadcaster,
            config,
            pending: Mutex::new(None),
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Run completion side effects for a finished batch
    ///
    /// Fires only when the batch's last step confirmed. A batch that ran to the
    /// end without reaching it gets a plain teardown and no side effects.
    pub async fn complete(
        &self,
        batch: &TxBatch,
        outcome: &BatchOutcome,
        state: &RunStateHandle,
    ) -> Option<Completion> {
        let Some(done) = outcome.completed else {
            warn!(action = %batch.action, last_step = %batch.last_step, "last step never confirmed");
            self.schedule_teardown(state, self.config.error_settle, None);
            return None;
        };

        info!(action = %batch.action, tx_hash = %done.tx_hash, "batch completed");
        state.set_message(batch.action.success_message());
        if let ReferralOutcome::Failed { reason } = &outcome.referral {
            state.set_error(format!("Referral not recorded: {reason}"));
        }

        let snapshot = match self.reader.refetch().await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "refetch after completion failed");
                None
            }
        };

        let mut broadcasts = Vec::new();
        if done.function == FunctionId::SortWeeklyReward {
            // the refetched counter already points at the new week
            match snapshot {
                Some(snapshot) => {
                    let closed_week = snapshot.week_id.saturating_sub(1);
                    self.broadcast(&templates::week_closed(closed_week), &mut broadcasts)
                        .await;
                }
                None => warn!("week unknown, skipping weekly broadcast"),
            }
        }
        if matches!(outcome.referral, ReferralOutcome::Submitted { .. }) {
            self.broadcast(&templates::referral_recorded(), &mut broadcasts)
                .await;
        }

        let destination = batch.action.destination();
        self.schedule_teardown(state, self.config.success_settle, Some(destination));

        Some(Completion {
            snapshot,
            broadcasts,
            destination,
        })
    }

    /// Surface a failed batch and schedule its teardown
    pub fn fail(&self, state: &RunStateHandle, error: &eyre::Report) {
        warn!(error = %format!("{error:#}"), "batch failed");
        state.set_error(SUPPORT_MESSAGE);
        self.schedule_teardown(state, self.config.error_settle, None);
    }

    /// Cancel a scheduled teardown, e.g. when the UI unmounts or a new batch starts
    pub fn cancel_pending(&self) {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(token) = pending {
            token.cancel();
        }
    }

    async fn broadcast(&self, text: &str, published: &mut Vec<String>) {
        let embeds = [self.config.app_url.clone()];
        match self.broadcaster.publish(text, &embeds).await {
            Ok(hash) => {
                info!(%hash, "broadcast published");
                published.push(hash);
            }
            Err(err) => warn!(error = %format!("{err:#}"), "broadcast failed"),
        }
    }

    fn schedule_teardown(
        &self,
        state: &RunStateHandle,
        delay: Duration,
        navigate_to: Option<Destination>,
    ) {
        let token = CancellationToken::new();
        let previous = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let state = state.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => debug!("teardown cancelled"),
                _ = tokio::time::sleep(delay) => state.teardown(navigate_to),
            }
        });
    }
}
