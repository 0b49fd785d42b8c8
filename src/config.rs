use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

use crate::extraction::{
    DEFAULT_HEADING_MARGIN, DEFAULT_SAMPLE_PAGES, ExtractionSettings, PreamblePolicy,
};
use crate::processing::chunking::DEFAULT_CHUNK_WORDS;

const DEFAULT_INPUT_DIR: &str = "input";
const DEFAULT_STORE_PATH: &str = "data/docs.json";
const DEFAULT_SEARCH_INDEX: &str = "sme-docs";
const DEFAULT_SEARCH_RESULT_LIMIT: usize = 2;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the extraction and indexing pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory scanned for source PDFs.
    pub input_dir: PathBuf,
    /// Location of the persisted heading store.
    pub store_path: PathBuf,
    /// Number of leading pages sampled when estimating the body font size.
    pub sample_pages: usize,
    /// Points added to the body font size to obtain the heading threshold.
    pub heading_margin: f32,
    /// Word budget for each chunk of a free-text submission.
    pub chunk_words: usize,
    /// What to do with body text seen before the first heading.
    pub preamble: PreamblePolicy,
    /// Base URL of the search engine; indexing is disabled when absent.
    pub search_url: Option<String>,
    /// Name of the search index receiving flattened records.
    pub search_index: String,
    /// Optional API key forwarded to the search engine.
    pub search_api_key: Option<String>,
    /// Number of hits returned per query.
    pub search_result_limit: usize,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let sample_pages = parse_optional(optional("SME_SAMPLE_PAGES"), "SME_SAMPLE_PAGES")?
            .unwrap_or(DEFAULT_SAMPLE_PAGES);
        if sample_pages == 0 {
            return Err(ConfigError::InvalidValue("SME_SAMPLE_PAGES".into()));
        }

        let heading_margin: f32 =
            parse_optional(optional("SME_HEADING_MARGIN"), "SME_HEADING_MARGIN")?
                .unwrap_or(DEFAULT_HEADING_MARGIN);
        if !heading_margin.is_finite() {
            return Err(ConfigError::InvalidValue("SME_HEADING_MARGIN".into()));
        }

        let chunk_words = parse_optional(optional("SME_CHUNK_WORDS"), "SME_CHUNK_WORDS")?
            .unwrap_or(DEFAULT_CHUNK_WORDS);
        if chunk_words == 0 {
            return Err(ConfigError::InvalidValue("SME_CHUNK_WORDS".into()));
        }

        let preamble = optional("SME_PREAMBLE_POLICY")
            .map(|value| {
                value
                    .parse()
                    .map_err(|()| ConfigError::InvalidValue("SME_PREAMBLE_POLICY".into()))
            })
            .transpose()?
            .unwrap_or_default();

        let search_result_limit =
            parse_optional(optional("SEARCH_RESULT_LIMIT"), "SEARCH_RESULT_LIMIT")?
                .unwrap_or(DEFAULT_SEARCH_RESULT_LIMIT);
        if search_result_limit == 0 {
            return Err(ConfigError::InvalidValue("SEARCH_RESULT_LIMIT".into()));
        }

        Ok(Self {
            input_dir: optional("SME_INPUT_DIR")
                .unwrap_or_else(|| DEFAULT_INPUT_DIR.into())
                .into(),
            store_path: optional("SME_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_STORE_PATH.into())
                .into(),
            sample_pages,
            heading_margin,
            chunk_words,
            preamble,
            search_url: optional("ES_HOST"),
            search_index: optional("ES_INDEX").unwrap_or_else(|| DEFAULT_SEARCH_INDEX.into()),
            search_api_key: optional("ES_API_KEY"),
            search_result_limit,
        })
    }

    /// Extraction knobs derived from this configuration.
    pub fn extraction_settings(&self) -> ExtractionSettings {
        ExtractionSettings {
            sample_pages: self.sample_pages,
            heading_margin: self.heading_margin,
            preamble: self.preamble,
        }
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        input_dir = %config.input_dir.display(),
        store_path = %config.store_path.display(),
        sample_pages = config.sample_pages,
        heading_margin = config.heading_margin,
        search_url = ?config.search_url,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
