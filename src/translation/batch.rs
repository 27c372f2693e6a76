/*!
 * Batch translation processing.
 *
 * Texts are translated in consecutive chunks. Inside a chunk every text is
 * sent concurrently (still bounded by the client's rate gate) and the chunk
 * settles before the next one starts. A text that fails is retried once on
 * its own; if that also fails, its source text is kept so the batch always
 * returns one entry per input, in input order.
 */

use futures::future::join_all;
use log::{debug, warn};

use super::core::TranslationClient;
use super::preferences::TranslationPreferences;

/// Result of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// One entry per input, in input order
    pub translations: Vec<String>,
    /// Input positions that fell back to their source text
    pub fallbacks: Vec<usize>,
}

impl TranslationClient {
    /// Translate `texts` in chunks of `chunk_size`, preserving order.
    ///
    /// Never fails: untranslatable entries keep their source text.
    pub async fn batch_translate(
        &self,
        texts: &[String],
        preferences: &TranslationPreferences,
        chunk_size: usize,
    ) -> Vec<String> {
        self.batch_translate_detailed(texts, preferences, chunk_size)
            .await
            .translations
    }

    /// Same as `batch_translate`, also reporting which positions fell back
    pub async fn batch_translate_detailed(
        &self,
        texts: &[String],
        preferences: &TranslationPreferences,
        chunk_size: usize,
    ) -> BatchOutcome {
        let chunk_size = chunk_size.max(1);
        let mut outcome = BatchOutcome {
            translations: Vec::with_capacity(texts.len()),
            fallbacks: Vec::new(),
        };

        for (chunk_index, chunk) in texts.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;
            debug!("Translating chunk {} ({} texts)", chunk_index + 1, chunk.len());

            let results = join_all(chunk.iter().map(|text| self.translate(text, preferences))).await;

            for (position, (source, result)) in chunk.iter().zip(results).enumerate() {
                let index = offset + position;
                let translated = match result {
                    Ok(translated) => translated,
                    Err(first_error) => {
                        debug!("Text {} failed in chunk ({}), retrying alone", index, first_error);
                        match self.translate(source, preferences).await {
                            Ok(translated) => translated,
                            Err(error) => {
                                warn!("Keeping source text for entry {}: {}", index, error);
                                outcome.fallbacks.push(index);
                                source.clone()
                            }
                        }
                    }
                };
                outcome.translations.push(translated);
            }
        }

        outcome
    }
}
