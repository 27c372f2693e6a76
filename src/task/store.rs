/*!
 * In-process registry of translation jobs.
 *
 * `TaskStore` owns the task map and the cache map. Both sit behind
 * `parking_lot` locks and are only touched through the methods below.
 * Mutations addressed to an unknown task id are ignored.
 */

use log::{debug, warn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

use super::models::{CacheKey, TaskReport, TaskStatus, TranslationTask};

/// Job registry with a completed-result cache
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<String, TranslationTask>>,
    cache: RwLock<HashMap<CacheKey, String>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request.
    ///
    /// Returns `(task_id, true)` when a completed task already exists for the
    /// same file name and language pair; otherwise stores a new pending task
    /// and returns `(new_id, false)`.
    pub fn create(&self, file_url: &str, file_name: &str, source_lang: &str, target_lang: &str) -> (String, bool) {
        let key = CacheKey::new(file_name, source_lang, target_lang);

        // Write locks are taken in the same order everywhere: cache, then tasks.
        let mut cache = self.cache.write();
        let mut tasks = self.tasks.write();

        if let Some(cached_id) = cache.get(&key) {
            if tasks.get(cached_id).is_some_and(|t| t.status == TaskStatus::Completed) {
                debug!("Cache hit for '{}' ({} -> {}): {}", file_name, source_lang, target_lang, cached_id);
                return (cached_id.clone(), true);
            }
        }

        let task_id = Uuid::new_v4().to_string();
        tasks.insert(
            task_id.clone(),
            TranslationTask::new(task_id.clone(), file_url, file_name, source_lang, target_lang),
        );

        cache.insert(key, task_id.clone());

        debug!("Created task {} for '{}' ({} -> {})", task_id, file_name, source_lang, target_lang);
        (task_id, false)
    }

    /// Snapshot of a task
    pub fn get(&self, task_id: &str) -> Option<TranslationTask> {
        self.tasks.read().get(task_id).cloned()
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    /// Move a task to `status`.
    ///
    /// Returns whether the task now has that status. Unknown ids and
    /// transitions out of terminal states are ignored.
    pub fn update_status(&self, task_id: &str, status: TaskStatus, error_message: Option<String>) -> bool {
        let mut cache = self.cache.write();
        let mut tasks = self.tasks.write();

        let Some(task) = tasks.get_mut(task_id) else {
            debug!("Ignoring status {} for unknown task {}", status, task_id);
            return false;
        };

        if task.status == status {
            return true;
        }
        if !task.status.can_transition_to(status) {
            warn!("Ignoring transition {} -> {} for task {}", task.status, status, task_id);
            return false;
        }

        task.status = status;
        if status == TaskStatus::Failed {
            task.error_message = Some(error_message.unwrap_or_else(|| "unknown error".to_string()));
        }
        if status == TaskStatus::Completed {
            task.progress = 100;
            cache.insert(task.cache_key(), task_id.to_string());
        }
        task.touch();

        debug!("Task {} is now {}", task_id, status);
        true
    }

    /// Record a progress percentage, clamped to 100 and never decreasing
    pub fn update_progress(&self, task_id: &str, percent: u8) -> bool {
        let mut tasks = self.tasks.write();
        let Some(task) = tasks.get_mut(task_id) else {
            return false;
        };
        let percent = percent.min(100);
        if percent > task.progress {
            task.progress = percent;
            task.touch();
        }
        true
    }

    /// Record where the result was written and what to call it for download
    pub fn set_result(&self, task_id: &str, path: impl Into<PathBuf>, display_name: &str) -> bool {
        let mut tasks = self.tasks.write();
        let Some(task) = tasks.get_mut(task_id) else {
            return false;
        };
        task.result_file_path = Some(path.into());
        task.download_name = Some(display_name.to_string());
        task.touch();
        true
    }

    /// Poller view of a task, reporting its stored status
    pub fn report(&self, task_id: &str) -> Option<TaskReport> {
        self.tasks.read().get(task_id).map(TaskReport::from_task)
    }
}
