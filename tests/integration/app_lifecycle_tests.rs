/*!
 * Full job lifecycle through `Controller::submit`
 */

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::Mutex;

use doctran::app_config::{Config, ProviderConfig, TranslationProvider};
use doctran::providers::mock::MockProvider;
use doctran::task::{TaskStatus, TaskStore};
use doctran::translation::TranslationPreferences;
use doctran::{Controller, PostProcessor};

use crate::common;

/// Records every processed path, optionally failing
struct RecordingPostProcessor {
    seen: Mutex<Vec<PathBuf>>,
    fail: bool,
}

#[async_trait]
impl PostProcessor for RecordingPostProcessor {
    async fn process(&self, _task_id: &str, output_path: &Path) -> Result<()> {
        self.seen.lock().push(output_path.to_path_buf());
        if self.fail {
            return Err(anyhow!("upload rejected"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn test_submit_sameDocumentTwice_shouldServeSecondFromCache() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let mock = MockProvider::working();
    let controller = Controller::new(common::mock_client(mock.clone()), store.clone());
    let prefs = TranslationPreferences::default();
    let bytes = common::sample_docx();

    let first = controller
        .submit("report.docx", "https://files/1", &bytes, &prefs, dir.path())
        .await
        .unwrap();
    assert!(!first.cached);
    assert_eq!(first.report.status, TaskStatus::Completed);
    assert!(first.report.download_url.starts_with(&format!("/api/download/{}/translated_", first.task_id)));
    assert!(first.report.download_url.ends_with("_report.docx"));
    let calls = mock.request_count();

    let second = controller
        .submit("report.docx", "https://files/2", &bytes, &prefs, dir.path())
        .await
        .unwrap();
    assert!(second.cached);
    assert_eq!(second.task_id, first.task_id);
    assert_eq!(second.report, first.report);
    assert_eq!(mock.request_count(), calls);

    let result_path = store.get(&first.task_id).unwrap().result_file_path.unwrap();
    assert!(result_path.starts_with(dir.path()));
    assert!(result_path.exists());
}

#[tokio::test]
async fn test_submit_withUnsupportedFile_shouldFailAndNotCache() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let controller = Controller::new(common::mock_client(MockProvider::working()), store.clone());
    let prefs = TranslationPreferences::default();

    let result = controller
        .submit("notes.txt", "u", b"just text", &prefs, dir.path())
        .await;
    assert!(result.is_err());
    assert_eq!(store.len(), 1);

    let (retry_id, cached) = store.create("u", "notes.txt", "en", "zh");
    assert!(!cached);
    assert_eq!(store.get(&retry_id).unwrap().status, TaskStatus::Pending);
}

#[tokio::test]
async fn test_submit_withFailingPostProcessor_shouldStillComplete() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let post = Arc::new(RecordingPostProcessor { seen: Mutex::new(Vec::new()), fail: true });
    let controller = Controller::new(common::mock_client(MockProvider::working()), store.clone())
        .with_post_processor(post.clone());

    let submission = controller
        .submit("report.docx", "u", &common::sample_docx(), &TranslationPreferences::default(), dir.path())
        .await
        .unwrap();

    assert_eq!(submission.report.status, TaskStatus::Completed);
    assert_eq!(post.seen.lock().len(), 1);
}

#[tokio::test]
async fn test_submit_withFailingProvider_shouldCompleteWithOriginalText() {
    let dir = common::create_temp_dir().unwrap();
    let store = Arc::new(TaskStore::new());
    let controller = Controller::new(common::mock_client(MockProvider::failing()), store.clone());

    let submission = controller
        .submit("report.docx", "u", &common::sample_docx(), &TranslationPreferences::default(), dir.path())
        .await
        .unwrap();
    assert_eq!(submission.report.status, TaskStatus::Completed);
    assert_eq!(submission.report.progress, 100);
}

#[test]
fn test_with_config_withExplicitKey_shouldBuildController() {
    let mut config = Config::default();
    let mut provider = ProviderConfig::new(TranslationProvider::DashScope);
    provider.api_key = "sk-test".to_string();
    config.translation.available_providers = vec![provider];

    let controller = Controller::with_config(&config, Arc::new(TaskStore::new())).unwrap();
    assert_eq!(controller.client().provider_name(), "dashscope");
}

#[test]
fn test_with_config_withoutAnyKey_shouldFail() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    if std::env::var("OPENAI_API_KEY").is_ok_and(|k| !k.trim().is_empty()) {
        return;
    }
    assert!(Controller::with_config(&config, Arc::new(TaskStore::new())).is_err());
}
