/*!
 * Prompt construction for document translation.
 *
 * This module provides the system prompt template rendered from a job's
 * translation preferences.
 */

pub mod templates;

// Re-export main types
pub use templates::{format_terminology, PromptTemplate};
