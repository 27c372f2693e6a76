/*!
 * Per-job progress counting.
 */

use log::trace;
use std::sync::Arc;

use super::store::TaskStore;

/// Counts completed units for one job and pushes percentages to the store
#[derive(Debug)]
pub struct ProgressTracker {
    store: Arc<TaskStore>,
    task_id: String,
    total: Option<usize>,
    current: usize,
}

impl ProgressTracker {
    pub fn new(store: Arc<TaskStore>, task_id: impl Into<String>) -> Self {
        Self {
            store,
            task_id: task_id.into(),
            total: None,
            current: 0,
        }
    }

    /// Fix the number of units. Only the first call has an effect.
    pub fn set_total(&mut self, total: usize) {
        if self.total.is_none() {
            self.total = Some(total);
        }
    }

    pub fn total(&self) -> usize {
        self.total.unwrap_or(0)
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Count `completed` more units and return the resulting percentage
    pub fn update(&mut self, completed: usize) -> u8 {
        self.current = self.current.saturating_add(completed);
        let percent = self.percent();
        trace!("Task {}: {}/{} ({}%)", self.task_id, self.current, self.total(), percent);
        self.store.update_progress(&self.task_id, percent);
        percent
    }

    /// min(100, 100 * current / total); 0 while total is 0
    pub fn percent(&self) -> u8 {
        match self.total() {
            0 => 0,
            total => (self.current.saturating_mul(100) / total).min(100) as u8,
        }
    }
}
