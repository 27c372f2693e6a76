use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::document::{Document, OpenOptions, StructuredDocument, WalkerConfig};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::task::{ProgressTracker, TaskReport, TaskStatus, TaskStore};
use crate::translation::{TranslationClient, TranslationPreferences};

// @module: Application controller for document translation jobs

/// Hook run after a translated document has been saved
#[async_trait]
pub trait PostProcessor: Send + Sync {
    /// Called once per completed job with the saved file
    async fn process(&self, task_id: &str, output_path: &Path) -> Result<()>;
}

/// What `Controller::submit` hands back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub task_id: String,
    /// The result came from an earlier completed job
    pub cached: bool,
    pub report: TaskReport,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: Shared translation client
    client: TranslationClient,
    // @field: Job registry
    store: Arc<TaskStore>,
    // @field: Which containers get translated
    walker: WalkerConfig,
    // @field: Document opening options
    open_options: OpenOptions,
    // @field: Units per batch
    chunk_size: usize,
    post_processor: Option<Arc<dyn PostProcessor>>,
}

impl Controller {
    /// Create a controller around an existing client and store
    pub fn new(client: TranslationClient, store: Arc<TaskStore>) -> Self {
        let chunk_size = client.options().chunk_size.max(1);
        Self {
            client,
            store,
            walker: WalkerConfig::default(),
            open_options: OpenOptions::default(),
            chunk_size,
            post_processor: None,
        }
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: &Config, store: Arc<TaskStore>) -> Result<Self> {
        config.validate()?;
        let client = TranslationClient::from_config(config)?;
        Ok(Self::new(client, store)
            .with_walker_config(config.walker.walker_config())
            .with_open_options(OpenOptions { merge_pdf_blocks: config.walker.merge_pdf_blocks }))
    }

    pub fn with_walker_config(mut self, walker: WalkerConfig) -> Self {
        self.walker = walker;
        self
    }

    pub fn with_open_options(mut self, open_options: OpenOptions) -> Self {
        self.open_options = open_options;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_post_processor(mut self, post_processor: Arc<dyn PostProcessor>) -> Self {
        self.post_processor = Some(post_processor);
        self
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    pub fn client(&self) -> &TranslationClient {
        &self.client
    }

    /// Register a document and translate it unless a completed result exists.
    ///
    /// The output lands in `output_dir` as `translated_{timestamp}_{file_name}`.
    /// A document that cannot be opened fails the job.
    pub async fn submit(
        &self,
        file_name: &str,
        file_url: &str,
        bytes: &[u8],
        preferences: &TranslationPreferences,
        output_dir: &Path,
    ) -> Result<Submission, AppError> {
        let (task_id, cached) = self.store.create(
            file_url,
            file_name,
            &preferences.source_lang,
            &preferences.target_lang,
        );

        if cached {
            info!("Reusing completed translation of '{}' (task {})", file_name, task_id);
            return Ok(self.submission(task_id, true));
        }

        let document = match Document::open_with(bytes, file_name, &self.open_options) {
            Ok(document) => document,
            Err(e) => {
                let e = AppError::from(e);
                error!("Cannot open '{}': {}", file_name, e);
                self.store.update_status(&task_id, TaskStatus::Failed, Some(e.to_string()));
                return Err(e);
            }
        };

        let output_path = FileManager::generate_output_path(output_dir, file_name);
        self.process_job(&task_id, document, preferences, &output_path).await?;
        Ok(self.submission(task_id, false))
    }

    fn submission(&self, task_id: String, cached: bool) -> Submission {
        let report = self.store.report(&task_id).unwrap_or(TaskReport {
            status: TaskStatus::Pending,
            progress: 0,
            download_url: String::new(),
            error_message: None,
        });
        Submission { task_id, cached, report }
    }

    /// Translate an opened document and save it to `output_path`.
    ///
    /// The task moves to `processing`, then to `completed` once the file is
    /// on disk, or to `failed` with the error message.
    pub async fn process_job(
        &self,
        task_id: &str,
        mut document: Document,
        preferences: &TranslationPreferences,
        output_path: &Path,
    ) -> Result<PathBuf, AppError> {
        let start_time = Instant::now();
        self.store.update_status(task_id, TaskStatus::Processing, None);

        match self.run_job(task_id, &mut document, preferences, output_path).await {
            Ok(path) => {
                self.store.update_status(task_id, TaskStatus::Completed, None);
                info!("Success: {} ({})", path.display(), Self::format_duration(start_time.elapsed()));

                if let Some(post_processor) = &self.post_processor {
                    if let Err(e) = post_processor.process(task_id, &path).await {
                        warn!("Post-processing of {} failed: {:#}", path.display(), e);
                    }
                }
                Ok(path)
            }
            Err(e) => {
                error!("Task {} failed: {}", task_id, e);
                self.store.update_status(task_id, TaskStatus::Failed, Some(e.to_string()));
                Err(e)
            }
        }
    }

    async fn run_job(
        &self,
        task_id: &str,
        document: &mut Document,
        preferences: &TranslationPreferences,
        output_path: &Path,
    ) -> Result<PathBuf, AppError> {
        let units = document.extract(&self.walker);
        let mut progress = ProgressTracker::new(self.store.clone(), task_id);
        progress.set_total(units.len());

        info!(
            "Translating {} units ({} -> {}) with {}",
            units.len(),
            preferences.source_lang,
            preferences.target_lang,
            self.client.provider_name()
        );

        for chunk in units.chunks(self.chunk_size) {
            let texts: Vec<String> = chunk.iter().map(|unit| unit.text.clone()).collect();
            let translations = self.client.batch_translate(&texts, preferences, self.chunk_size).await;

            for (unit, translated) in chunk.iter().zip(translations.iter()) {
                document.apply(unit, translated);
                progress.update(1);
                tokio::task::yield_now().await;
            }
            debug!("Task {}: {}/{} units done", task_id, progress.current(), progress.total());
        }

        let bytes = document.serialize()?;
        FileManager::write_bytes(output_path, &bytes)?;

        let display_name = FileManager::file_name_of(output_path);
        self.store.set_result(task_id, output_path, &display_name);
        Ok(output_path.to_path_buf())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
