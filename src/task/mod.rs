/*!
 * Job tracking: records, the in-process store and progress counting.
 */

pub mod models;
pub mod progress;
pub mod store;

pub use models::{CacheKey, TaskReport, TaskStatus, TranslationTask};
pub use progress::ProgressTracker;
pub use store::TaskStore;
