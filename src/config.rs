use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_SUMMARY_MODEL: &str = "gpt-5.2";
const DEFAULT_SUMMARY_TEMPERATURE: f32 = 0.5;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarizer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Hacker News API.
    pub hn_api_base: String,
    /// Timeout applied to the newest-stories index request.
    pub index_timeout: Duration,
    /// Timeout applied to each item detail request.
    pub item_timeout: Duration,
    /// Timeout applied to each article download.
    pub article_timeout: Duration,
    /// Backend used for text generation.
    pub generation_provider: GenerationProvider,
    /// Credential for the OpenAI API; required when the provider is OpenAI.
    pub openai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible chat completions API.
    pub openai_base_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Timeout applied to each generation call.
    pub generation_timeout: Duration,
    /// Default model identifier passed to the generator.
    pub summary_model: String,
    /// Default sampling temperature in `[0, 1]`.
    pub summary_temperature: f32,
    /// Optional prompt template file overriding the built-in template.
    pub prompt_template_path: Option<PathBuf>,
    /// Optional log file receiving a copy of all tracing output.
    pub log_file: Option<PathBuf>,
}

/// Supported text-generation backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationProvider {
    /// Hosted OpenAI chat completions.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, validating every value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let generation_provider = match optional("GENERATION_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("GENERATION_PROVIDER".into()))?,
            None => GenerationProvider::OpenAI,
        };

        let openai_api_key = optional("OPENAI_API_KEY");
        if generation_provider == GenerationProvider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".into()));
        }

        let summary_temperature = parse_optional(&optional, "SUMMARY_TEMPERATURE")?
            .unwrap_or(DEFAULT_SUMMARY_TEMPERATURE);
        if !(0.0..=1.0).contains(&summary_temperature) {
            return Err(ConfigError::InvalidValue("SUMMARY_TEMPERATURE".into()));
        }

        Ok(Self {
            hn_api_base: optional("HN_API_BASE").unwrap_or_else(|| DEFAULT_HN_API_BASE.into()),
            index_timeout: seconds(&optional, "INDEX_TIMEOUT_SECS", 5)?,
            item_timeout: seconds(&optional, "ITEM_TIMEOUT_SECS", 5)?,
            article_timeout: seconds(&optional, "ARTICLE_TIMEOUT_SECS", 10)?,
            generation_provider,
            openai_api_key,
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            ollama_url: optional("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.into()),
            generation_timeout: seconds(&optional, "GENERATION_TIMEOUT_SECS", 60)?,
            summary_model: optional("SUMMARY_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARY_MODEL.into()),
            summary_temperature,
            prompt_template_path: optional("SUMMARY_PROMPT_PATH").map(PathBuf::from),
            log_file: optional("HN_SUMMARIZER_LOG_FILE").map(PathBuf::from),
        })
    }
}

fn parse_optional<T, F>(optional: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

fn seconds<F>(optional: &F, key: &str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse_optional(optional, key)?.unwrap_or(default);
    if secs == 0 {
        return Err(ConfigError::InvalidValue(key.to_string()));
    }
    Ok(Duration::from_secs(secs))
}

impl std::str::FromStr for GenerationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load `.env` plus the process environment and install the result in the global cache.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
