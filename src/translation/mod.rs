/*!
 * Translation client for document units using AI providers.
 *
 * It is split into several submodules:
 *
 * - `core`: the `TranslationClient` and its retry loop
 * - `batch`: chunked fan-out/fan-in over many texts
 * - `rate_gate`: concurrency bound and request pacing
 * - `retry`: backoff schedule and error classification
 * - `preferences`: per-job translation preferences
 * - `prompts`: system prompt templates
 */

// Re-export main types for easier usage
pub use self::batch::BatchOutcome;
pub use self::core::{TranslationClient, TranslationOptions};
pub use self::preferences::TranslationPreferences;
pub use self::rate_gate::{GatePermit, RateGate, RateGateConfig};
pub use self::retry::{RetryDecision, RetryPolicy};

// Submodules
pub mod batch;
pub mod core;
pub mod preferences;
pub mod prompts;
pub mod rate_gate;
pub mod retry;
