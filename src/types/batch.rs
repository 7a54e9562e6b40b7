//! Transaction batches and per-run context

use super::descriptor::{FunctionId, TxDescriptor};
use tokio::sync::watch;

/// Ordered descriptors submitted as one user action
#[derive(Debug, Clone)]
pub struct TxBatch {
    /// Action the user triggered; drives messages, broadcasts and navigation
    pub action: FunctionId,
    pub descriptors: Vec<TxDescriptor>,
    /// Function whose confirmation marks the batch complete
    pub last_step: FunctionId,
}

impl TxBatch {
    /// Batch whose last step is the final descriptor's function
    pub fn new(action: FunctionId, descriptors: Vec<TxDescriptor>) -> Self {
        let last_step = descriptors
            .last()
            .map(TxDescriptor::function_id)
            .unwrap_or(action);
        Self {
            action,
            descriptors,
            last_step,
        }
    }

    /// Override the last step
    pub fn with_last_step(mut self, last_step: FunctionId) -> Self {
        self.last_step = last_step;
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Caller-side inputs that are only known while the batch runs
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Live quiz result; read when `recordPoints` is submitted
    pub quiz_points: Option<watch::Receiver<u32>>,
}

impl RunContext {
    pub fn with_quiz_points(mut self, quiz_points: watch::Receiver<u32>) -> Self {
        self.quiz_points = Some(quiz_points);
        self
    }

    /// Current quiz result, if the caller supplied one
    pub fn current_points(&self) -> Option<u32> {
        self.quiz_points.as_ref().map(|rx| *rx.borrow())
    }
}
