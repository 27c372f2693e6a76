/*!
 * Prompt templates for document translation.
 *
 * The system instruction carries everything the provider needs to know
 * about the job; the user message is the bare unit text.
 */

use crate::language_utils::describe_language;
use crate::translation::preferences::TranslationPreferences;

/// System prompt template for document translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt for document translation.
    pub const DOCUMENT_TRANSLATOR: &'static str = r#"You are a professional translator working from {source_language} into {target_language}.

## Requirements
1. Keep the tone and style of the original text
2. Use natural, idiomatic {target_language} phrasing
3. Translate technical terms accurately and consistently
4. For culture-specific expressions, add a brief explanation in parentheses

## Style
- Formality: {formality}
- Domain: {domain}

## Terminology
{terminology}

## Preferences
- Keep original terms: {keep_original_terms}
- Provide alternatives: {provide_alternatives}
- Translate by paragraph: {translate_by_paragraph}
- Keep formatting: {keep_formatting}

Reply with the translation only, without commentary or quotation marks."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default document translator template.
    pub fn document_translator() -> Self {
        Self::new(Self::DOCUMENT_TRANSLATOR)
    }

    /// Render the template for a job's preferences.
    pub fn render(&self, preferences: &TranslationPreferences) -> String {
        self.template
            .replace("{source_language}", &describe_language(&preferences.source_lang))
            .replace("{target_language}", &describe_language(&preferences.target_lang))
            .replace("{formality}", &preferences.formality_level)
            .replace("{domain}", &preferences.domain)
            .replace("{terminology}", &format_terminology(preferences))
            .replace("{keep_original_terms}", yes_no(preferences.keep_original_terms))
            .replace("{provide_alternatives}", yes_no(preferences.provide_alternatives))
            .replace("{translate_by_paragraph}", yes_no(preferences.translate_by_paragraph))
            .replace("{keep_formatting}", yes_no(preferences.keep_formatting))
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::document_translator()
    }
}

/// One `- term => rendering` line per entry, or `none`
pub fn format_terminology(preferences: &TranslationPreferences) -> String {
    if preferences.terminology_mapping.is_empty() {
        return "none".to_string();
    }
    preferences.terminology_mapping.iter()
        .map(|(term, rendering)| format!("- {} => {}", term, rendering))
        .collect::<Vec<_>>()
        .join("\n")
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_shouldEmbedLanguagesAndSwitches() {
        let prefs = TranslationPreferences::new("en", "fr").with_domain("legal");
        let prompt = PromptTemplate::default().render(&prefs);

        assert!(prompt.contains("from English (en) into French (fr)"));
        assert!(prompt.contains("- Domain: legal"));
        assert!(prompt.contains("- Provide alternatives: no"));
        assert!(prompt.contains("- Keep formatting: yes"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_format_terminology_withEntries_shouldListSorted() {
        let prefs = TranslationPreferences::default()
            .with_term("widget", "组件")
            .with_term("API", "接口");
        assert_eq!(format_terminology(&prefs), "- API => 接口\n- widget => 组件");
    }

    #[test]
    fn test_format_terminology_withEmptyMapping_shouldBeNone() {
        assert_eq!(format_terminology(&TranslationPreferences::default()), "none");
    }
}
