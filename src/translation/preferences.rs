/*!
 * Per-job translation preferences.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings that shape the provider prompt for one job.
///
/// Immutable once the job starts; the client only reads them to render the
/// system instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationPreferences {
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Register to write in, e.g. "formal"
    pub formality_level: String,
    /// Subject area, e.g. "technical"
    pub domain: String,
    /// Leave proper nouns and technical terms untranslated where sensible
    pub keep_original_terms: bool,
    /// Offer alternative renderings for ambiguous phrases
    pub provide_alternatives: bool,
    /// Translate whole paragraphs rather than sentence by sentence
    pub translate_by_paragraph: bool,
    /// Preserve inline formatting markers
    pub keep_formatting: bool,
    /// Preferred rendering for each source term, in stable order
    #[serde(default)]
    pub terminology_mapping: BTreeMap<String, String>,
}

impl TranslationPreferences {
    /// Defaults for a language pair
    pub fn new(source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            ..Self::default()
        }
    }

    pub fn with_formality(mut self, formality: impl Into<String>) -> Self {
        self.formality_level = formality.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn with_term(mut self, term: impl Into<String>, rendering: impl Into<String>) -> Self {
        self.terminology_mapping.insert(term.into(), rendering.into());
        self
    }
}

impl Default for TranslationPreferences {
    fn default() -> Self {
        Self {
            source_lang: "en".to_string(),
            target_lang: "zh".to_string(),
            formality_level: "formal".to_string(),
            domain: "technical".to_string(),
            keep_original_terms: true,
            provide_alternatives: false,
            translate_by_paragraph: true,
            keep_formatting: true,
            terminology_mapping: BTreeMap::new(),
        }
    }
}
