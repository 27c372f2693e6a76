/*!
 * Job records and the views handed to pollers.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;

/// Lifecycle of a translation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Registered, not started
    Pending,
    /// Being extracted, translated or saved
    Processing,
    /// Result saved
    Completed,
    /// Aborted with an error message
    Failed,
}

impl TaskStatus {
    /// No transition leaves a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether moving to `next` is allowed.
    ///
    /// Re-entering the current non-terminal state is allowed and has no effect.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        match (self, next) {
            (TaskStatus::Pending, TaskStatus::Pending) => true,
            (TaskStatus::Pending, TaskStatus::Processing) => true,
            (TaskStatus::Pending, TaskStatus::Failed) => true,
            (TaskStatus::Processing, TaskStatus::Processing) => true,
            (TaskStatus::Processing, TaskStatus::Completed) => true,
            (TaskStatus::Processing, TaskStatus::Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
        }
    }
}

/// Deterministic identity of a translation request: (file name, language pair)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(file_name: &str, source_lang: &str, target_lang: &str) -> Self {
        let mut hasher = Sha256::new();
        for part in [file_name, source_lang, target_lang] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        Self(digest.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One translation job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationTask {
    pub task_id: String,
    pub file_url: String,
    pub file_name: String,
    pub source_lang: String,
    pub target_lang: String,
    pub status: TaskStatus,
    /// Percent complete, 0..=100, truncated to a whole number (1 of 3 units is 33)
    pub progress: u8,
    pub result_file_path: Option<PathBuf>,
    /// File name offered to whoever downloads the result
    pub download_name: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationTask {
    pub fn new(
        task_id: String,
        file_url: &str,
        file_name: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            file_url: file_url.to_string(),
            file_name: file_name.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            status: TaskStatus::Pending,
            progress: 0,
            result_file_path: None,
            download_name: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.file_name, &self.source_lang, &self.target_lang)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// What a poller sees for a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskReport {
    pub status: TaskStatus,
    pub progress: u8,
    /// `/api/download/{task_id}/{name}` once completed, empty otherwise
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl TaskReport {
    pub fn from_task(task: &TranslationTask) -> Self {
        let download_url = match (task.status, &task.result_file_path) {
            (TaskStatus::Completed, Some(path)) => {
                let name = task.download_name.clone().unwrap_or_else(|| {
                    path.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });
                format!("/api/download/{}/{}", task.task_id, name)
            }
            _ => String::new(),
        };

        Self {
            status: task.status,
            progress: task.progress,
            download_url,
            error_message: match task.status {
                TaskStatus::Failed => task.error_message.clone(),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_shouldSerializeWithTimestamps() {
        let task = TranslationTask::new("t-1".into(), "u", "doc.docx", "en", "zh");
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"created_at\""));

        let restored: TranslationTask = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, task);
    }

    #[test]
    fn test_can_transition_to_shouldFollowLifecycle() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Processing));
        assert!(TaskStatus::Processing.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Processing));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Failed));
    }

    #[test]
    fn test_cache_key_shouldDependOnAllParts() {
        let key = CacheKey::new("a.docx", "en", "zh");
        assert_eq!(key, CacheKey::new("a.docx", "en", "zh"));
        assert_ne!(key, CacheKey::new("a.docx", "en", "fr"));
        assert_ne!(CacheKey::new("ab", "c", "d"), CacheKey::new("a", "bc", "d"));
        assert_eq!(key.as_str().len(), 64);
    }

    #[test]
    fn test_status_serde_shouldUseSnakeCase() {
        assert_eq!(serde_json::to_string(&TaskStatus::Processing).unwrap(), "\"processing\"");
        assert_eq!("FAILED".parse::<TaskStatus>().unwrap(), TaskStatus::Failed);
    }

    #[test]
    fn test_report_forFailedTask_shouldCarryError() {
        let mut task = TranslationTask::new("t1".into(), "u", "a.pdf", "en", "zh");
        task.status = TaskStatus::Failed;
        task.error_message = Some("boom".into());
        let report = TaskReport::from_task(&task);
        assert_eq!(report.error_message.as_deref(), Some("boom"));
        assert!(report.download_url.is_empty());
    }
}
