/*!
 * Tests for configuration loading and defaults
 */

use anyhow::Result;
use doctran::app_config::{Config, TranslationProvider};
use crate::common;

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert!(path.exists());
    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_language, "zh");
    assert_eq!(config.translation.provider, TranslationProvider::DashScope);

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.translation.common.chunk_size, config.translation.common.chunk_size);
    Ok(())
}

#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{
            "source_language": "fr",
            "target_language": "en",
            "translation": { "provider": "openai", "common": { "max_concurrent_requests": 4 } }
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.common.max_concurrent_requests, 4);
    assert_eq!(config.translation.common.min_request_interval_ms, 1000);
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
    assert!(config.walker.include_tables);
    config.validate()?;
    Ok(())
}

#[test]
fn test_validate_withUnknownLanguage_shouldFail() {
    let config = Config {
        target_language: "not-a-language".to_string(),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_preferences_shouldCarryConfiguredDefaults() {
    let mut config = Config::default();
    config.preferences.terminology.insert("ledger".into(), "总账".into());
    let prefs = config.preferences();

    assert_eq!(prefs.source_lang, "en");
    assert_eq!(prefs.formality_level, "formal");
    assert_eq!(prefs.terminology_mapping.get("ledger").map(String::as_str), Some("总账"));
}
