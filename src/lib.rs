/*!
 * # doctran - structure-preserving document translation
 *
 * A Rust library that translates DOCX and PDF documents with AI providers
 * while keeping the original layout and run-level formatting.
 *
 * ## Features
 *
 * - Walk body paragraphs, tables, headers and footers into translation units
 * - Translate units through DashScope (Qwen) or an OpenAI-compatible API
 * - Bounded concurrency and request pacing shared by a whole job
 * - Retry with exponential backoff, then per-unit fallback to the source text
 * - Proportional redistribution of translated text across formatting runs
 * - In-process job tracking with progress and a completed-result cache
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document`: Document model and format handling:
 *   - `document::docx`: WordprocessingML packages
 *   - `document::pdf`: PDF text blocks
 *   - `document::walker`: Translation unit extraction
 *   - `document::redistribute`: Writing translations back into runs
 * - `translation`: Translation client:
 *   - `translation::core`: Single-text translation with retries
 *   - `translation::batch`: Chunked batch translation
 *   - `translation::rate_gate`: Concurrency bound and pacing
 * - `task`: Job records, store and progress tracking
 * - `app_controller`: Job orchestration
 * - `providers`: Client implementations for LLM backends
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod task;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, PostProcessor, Submission};
pub use document::{Document, DocumentFormat, StructuredDocument, TranslationUnit, WalkerConfig};
pub use errors::{AppError, ExtractionError, PersistenceError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use task::{ProgressTracker, TaskReport, TaskStatus, TaskStore};
pub use translation::{TranslationClient, TranslationPreferences};
