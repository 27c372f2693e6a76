/*!
 * Tests for the translation client, batching and rate gating
 */

use std::sync::Arc;
use std::time::Duration;

use doctran::errors::TranslationError;
use doctran::providers::mock::MockProvider;
use doctran::translation::{RateGateConfig, TranslationClient, TranslationPreferences};

use crate::common;

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_batch_translate_withOneBadUnit_shouldDegradeOnlyThatUnit() {
    common::init_logging();
    let mock = MockProvider::failing_on("BAD");
    let client = common::mock_client(mock.clone());
    let prefs = TranslationPreferences::default();

    let result = client
        .batch_translate(&texts(&["alpha", "BAD beta", "gamma", "delta"]), &prefs, 2)
        .await;

    assert_eq!(result, vec!["[TR] alpha", "BAD beta", "[TR] gamma", "[TR] delta"]);
    // three good texts once, the bad one twice in its chunk and twice alone
    assert_eq!(mock.request_count(), 3 + 4);
}

#[tokio::test]
async fn test_batch_translate_detailed_shouldReportFallbackPositions() {
    let client = common::mock_client(MockProvider::failing_on("x"));
    let outcome = client
        .batch_translate_detailed(&texts(&["a", "x1", "b", "x2"]), &TranslationPreferences::default(), 10)
        .await;
    assert_eq!(outcome.fallbacks, vec![1, 3]);
    assert_eq!(outcome.translations.len(), 4);
}

#[tokio::test]
async fn test_translate_withNonTransientError_shouldNotRetry() {
    let mock = MockProvider::malformed();
    let client = common::mock_client(mock.clone());

    let result = client.translate("hello", &TranslationPreferences::default()).await;
    assert!(matches!(result, Err(TranslationError::Provider(_))));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_translate_withEmptyCompletion_shouldFailWithoutRetry() {
    let mock = MockProvider::empty();
    let client = common::mock_client(mock.clone());

    let result = client.translate("hello", &TranslationPreferences::default()).await;
    assert!(matches!(result, Err(TranslationError::EmptyResponse)));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_batch_translate_withEmptyCompletions_shouldFallBackToSource() {
    let mock = MockProvider::empty();
    let client = common::mock_client(mock.clone());

    let outcome = client
        .batch_translate_detailed(&texts(&["one", "two"]), &TranslationPreferences::default(), 10)
        .await;
    assert_eq!(outcome.translations, vec!["one", "two"]);
    assert_eq!(outcome.fallbacks, vec![0, 1]);
    // one call in the chunk and one isolated call per text
    assert_eq!(mock.request_count(), 4);
}

#[tokio::test]
async fn test_translate_withWhitespace_shouldSkipProvider() {
    let mock = MockProvider::working();
    let client = common::mock_client(mock.clone());
    assert_eq!(client.translate("  \n", &TranslationPreferences::default()).await.unwrap(), "  \n");
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_batch_translate_withGateOfTwo_shouldCapConcurrency() {
    let mock = MockProvider::slow(20);
    let mut options = common::fast_options();
    options.gate = RateGateConfig { max_concurrent: 2, min_interval: Duration::ZERO };
    let client = TranslationClient::new(Arc::new(mock.clone()), options);

    let inputs: Vec<String> = (0..8).map(|i| format!("text {}", i)).collect();
    let result = client.batch_translate(&inputs, &TranslationPreferences::default(), 8).await;

    assert_eq!(result.len(), 8);
    assert!(mock.peak_in_flight() <= 2);
    assert_eq!(mock.request_count(), 8);
}

#[tokio::test]
async fn test_system_prompt_shouldNameLanguagesAndTerminology() {
    let client = common::mock_client(MockProvider::working());
    let prefs = TranslationPreferences::new("en", "fr").with_term("invoice", "facture");
    let prompt = client.system_prompt(&prefs);

    assert!(prompt.contains("English"));
    assert!(prompt.contains("French"));
    assert!(prompt.contains("- invoice => facture"));
}
