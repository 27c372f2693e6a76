use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::document::walker::WalkerConfig;
use crate::translation::preferences::TranslationPreferences;
use crate::translation::rate_gate::RateGateConfig;
use crate::translation::retry::RetryPolicy;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    pub source_language: String,

    /// Target language code (ISO)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Which document containers are traversed
    #[serde(default)]
    pub walker: WalkerSettings,

    /// Default translation preferences
    #[serde(default)]
    pub preferences: PreferenceDefaults,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Alibaba DashScope (Qwen)
    #[default]
    DashScope,
    // @provider: OpenAI-compatible chat completions
    OpenAI,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::DashScope => "DashScope",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::DashScope => "dashscope".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }

    // @returns: Environment variables consulted for a credential, in order
    pub fn credential_env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::DashScope => &["DASHSCOPE_API_KEY", "API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "dashscope" | "qwen" => Ok(Self::DashScope),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key, falls back to the environment when empty
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::DashScope => Self {
                provider_type: "dashscope".to_string(),
                model: default_dashscope_model(),
                api_key: String::new(),
                endpoint: default_dashscope_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                api_key: String::new(),
                endpoint: default_openai_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Maximum number of provider calls in flight at once
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Minimum spacing between two request starts in milliseconds
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Total attempts per translation call, including the first
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base backoff delay in milliseconds, doubled on each retry
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Upper bound on a single backoff delay in milliseconds
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Randomize each backoff delay between zero and its computed value
    #[serde(default)]
    pub retry_jitter: bool,

    /// Number of units translated concurrently per batch chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: default_max_concurrent_requests(),
            min_request_interval_ms: default_min_request_interval_ms(),
            retry_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            retry_jitter: false,
            chunk_size: default_chunk_size(),
            temperature: default_temperature(),
        }
    }
}

impl TranslationCommonConfig {
    pub fn rate_gate_config(&self) -> RateGateConfig {
        RateGateConfig {
            max_concurrent: self.max_concurrent_requests,
            min_interval: std::time::Duration::from_millis(self.min_request_interval_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            base_delay: std::time::Duration::from_millis(self.retry_base_delay_ms),
            max_delay: std::time::Duration::from_millis(self.retry_max_delay_ms),
            jitter: self.retry_jitter,
        }
    }
}

/// Container traversal switches
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WalkerSettings {
    #[serde(default = "default_true")]
    pub include_tables: bool,

    #[serde(default = "default_true")]
    pub include_headers: bool,

    #[serde(default = "default_true")]
    pub include_footers: bool,

    /// Merge PDF text blocks into logical paragraphs before extraction
    #[serde(default = "default_true")]
    pub merge_pdf_blocks: bool,
}

impl Default for WalkerSettings {
    fn default() -> Self {
        Self {
            include_tables: true,
            include_headers: true,
            include_footers: true,
            merge_pdf_blocks: true,
        }
    }
}

impl WalkerSettings {
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            include_tables: self.include_tables,
            include_headers: self.include_headers,
            include_footers: self.include_footers,
        }
    }
}

/// Preference values applied to every job unless overridden
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PreferenceDefaults {
    #[serde(default = "default_formality")]
    pub formality_level: String,

    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default = "default_true")]
    pub keep_original_terms: bool,

    #[serde(default)]
    pub provide_alternatives: bool,

    #[serde(default = "default_true")]
    pub translate_by_paragraph: bool,

    #[serde(default = "default_true")]
    pub keep_formatting: bool,

    /// Preferred renderings keyed by source term
    #[serde(default)]
    pub terminology: BTreeMap<String, String>,
}

impl Default for PreferenceDefaults {
    fn default() -> Self {
        Self {
            formality_level: default_formality(),
            domain: default_domain(),
            keep_original_terms: true,
            provide_alternatives: false,
            translate_by_paragraph: true,
            keep_formatting: true,
            terminology: BTreeMap::new(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_concurrent_requests() -> usize {
    20
}

fn default_min_request_interval_ms() -> u64 {
    1000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    4000
}

fn default_retry_max_delay_ms() -> u64 {
    10_000
}

fn default_chunk_size() -> usize {
    10
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_formality() -> String {
    "formal".to_string()
}

fn default_domain() -> String {
    "technical".to_string()
}

fn default_dashscope_endpoint() -> String {
    "https://dashscope.aliyuncs.com/api/v1".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_dashscope_model() -> String {
    "qwen-max".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Config {
    /// Load a configuration file, writing the defaults first when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            Ok(config)
        } else {
            log::warn!("Config file not found at {:?}, creating default config.", path);
            let config = Config::default();
            let config_json = serde_json::to_string_pretty(&config)
                .context("Failed to serialize default config to JSON")?;
            std::fs::write(path, config_json)
                .with_context(|| format!("Failed to write default config to file: {:?}", path))?;
            Ok(config)
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.source_language)?;
        crate::language_utils::get_language_name(&self.target_language)?;

        let common = &self.translation.common;
        if common.max_concurrent_requests == 0 {
            return Err(anyhow!("max_concurrent_requests must be at least 1"));
        }
        if common.retry_attempts == 0 {
            return Err(anyhow!("retry_attempts must be at least 1"));
        }
        if common.chunk_size == 0 {
            return Err(anyhow!("chunk_size must be at least 1"));
        }
        if !(0.0..=2.0).contains(&common.temperature) {
            return Err(anyhow!("temperature must be between 0.0 and 2.0, got {}", common.temperature));
        }

        Ok(())
    }

    /// Build the per-job preferences from the configured defaults
    pub fn preferences(&self) -> TranslationPreferences {
        let defaults = &self.preferences;
        TranslationPreferences {
            source_lang: self.source_language.clone(),
            target_lang: self.target_language.clone(),
            formality_level: defaults.formality_level.clone(),
            domain: defaults.domain.clone(),
            keep_original_terms: defaults.keep_original_terms,
            provide_alternatives: defaults.provide_alternatives,
            translate_by_paragraph: defaults.translate_by_paragraph,
            keep_formatting: defaults.keep_formatting,
            terminology_mapping: defaults.terminology.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "en".to_string(),
            target_language: "zh".to_string(),
            translation: TranslationConfig::default(),
            walker: WalkerSettings::default(),
            preferences: PreferenceDefaults::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::DashScope => default_dashscope_model(),
            TranslationProvider::OpenAI => default_openai_model(),
        }
    }

    /// Get the API key for the active provider, consulting the environment
    /// when the config leaves it empty. Returns an empty string when neither has one.
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider.credential_env_vars()
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::DashScope => default_dashscope_endpoint(),
            TranslationProvider::OpenAI => default_openai_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::DashScope),
                ProviderConfig::new(TranslationProvider::OpenAI),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
