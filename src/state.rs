//! Run state observed by UI layers while a batch is in flight

use crate::types::FunctionId;
use std::sync::Arc;
use tokio::sync::watch;

/// Screen a UI should show once a batch settles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Home,
    Stats,
    Profile,
}

/// Ephemeral state of the active batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// True while any descriptor of the active batch is in flight
    pub loading: bool,
    pub message: Option<String>,
    pub error_message: Option<String>,
    /// Function whose confirmation completes the active batch
    pub last_step: Option<FunctionId>,
    pub drawer_open: bool,
    /// Set by teardown after a completed batch
    pub navigate_to: Option<Destination>,
}

/// Shared handle to the run state
///
/// Cloning the handle shares the same state; subscribers see every update.
#[derive(Debug, Clone)]
pub struct RunStateHandle {
    tx: Arc<watch::Sender<RunState>>,
}

impl Default for RunStateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RunState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.tx.subscribe()
    }

    /// Snapshot of the current state
    pub fn get(&self) -> RunState {
        self.tx.borrow().clone()
    }

    /// Mark a batch as started
    pub fn begin(&self, last_step: FunctionId) {
        self.tx.send_modify(|state| {
            *state = RunState {
                loading: true,
                message: Some("Processing transaction...".to_string()),
                last_step: Some(last_step),
                drawer_open: true,
                ..RunState::default()
            };
        });
    }

    pub fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| state.message = Some(message));
    }

    pub fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.tx.send_modify(|state| state.error_message = Some(error));
    }

    /// Reset to defaults, optionally leaving a navigation hint
    pub fn teardown(&self, navigate_to: Option<Destination>) {
        self.tx.send_modify(|state| {
            *state = RunState {
                navigate_to,
                ..RunState::default()
            };
        });
    }
}
