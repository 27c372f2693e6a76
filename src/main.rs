// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use doctran::app_config::{self, Config, TranslationProvider};
use doctran::document::{Document, OpenOptions};
use doctran::file_utils::FileManager;
use doctran::{Controller, TaskStatus, TaskStore};

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "dashscope")]
    DashScope,
    #[value(name = "openai")]
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::DashScope => TranslationProvider::DashScope,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a DOCX or PDF document
    Translate(TranslateArgs),
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Document to translate
    #[arg(value_name = "FILE")]
    input_file: PathBuf,

    /// Source language code (e.g., 'en', 'zh', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'zh', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory for the translated document (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// doctran - structure-preserving document translation with AI
///
/// Translates DOCX and PDF documents while keeping paragraphs, tables,
/// headers, footers and run formatting in place.
#[derive(Parser, Debug)]
#[command(name = "doctran")]
#[command(version)]
#[command(about = "AI-powered document translation tool")]
#[command(long_about = "doctran translates DOCX and PDF documents with AI providers while preserving their layout.

EXAMPLES:
    doctran translate report.docx                    # Translate using default config
    doctran translate -s en -t fr report.docx        # Translate from English to French
    doctran translate -o out/ -p openai paper.pdf    # Use OpenAI and write into out/

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

CREDENTIALS:
    dashscope - DASHSCOPE_API_KEY or API_KEY
    openai    - OPENAI_API_KEY")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Most verbose level accepted; the effective level comes from the config or CLI
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();
    match cli.command {
        Commands::Translate(args) => run_translate(args).await,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    if !FileManager::file_exists(&options.input_file) {
        return Err(anyhow!("Input file does not exist: {:?}", options.input_file));
    }

    let file_name = FileManager::file_name_of(&options.input_file);
    let output_dir = options.output_dir.clone().unwrap_or_else(|| {
        options.input_file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });
    FileManager::ensure_dir(&output_dir)?;

    let bytes = FileManager::read_bytes(&options.input_file)?;
    let document = Document::open_with(
        &bytes,
        &file_name,
        &OpenOptions { merge_pdf_blocks: config.walker.merge_pdf_blocks },
    )?;

    let store = Arc::new(TaskStore::new());
    let controller = Arc::new(Controller::with_config(&config, store.clone())?);
    let preferences = config.preferences();

    info!(
        "doctran: {} - {}",
        config.translation.provider.display_name(),
        config.translation.get_model()
    );

    let file_url = options.input_file.display().to_string();
    let (task_id, _) = store.create(&file_url, &file_name, &preferences.source_lang, &preferences.target_lang);
    let output_path = FileManager::generate_output_path(&output_dir, &file_name);

    let job = {
        let controller = controller.clone();
        let task_id = task_id.clone();
        tokio::spawn(async move {
            controller.process_job(&task_id, document, &preferences, &output_path).await
        })
    };

    let progress_bar = ProgressBar::new(100);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("#>-"));
    progress_bar.set_message(file_name.clone());

    while !job.is_finished() {
        if let Some(report) = store.report(&task_id) {
            progress_bar.set_position(report.progress as u64);
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    progress_bar.finish_and_clear();

    let result = job.await.context("Translation job panicked")?;
    let report = store.report(&task_id);

    match (result, report) {
        (Ok(path), Some(report)) if report.status == TaskStatus::Completed => {
            info!("Success: {}", path.display());
            Ok(())
        }
        (Ok(path), _) => {
            warn!("Output written to {} but the task did not complete", path.display());
            Ok(())
        }
        (Err(e), _) => {
            error!("Translation of '{}' failed", file_name);
            Err(e.into())
        }
    }
}
