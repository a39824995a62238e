//! Configuration management for the task list assistant.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first by the binaries):
//! - `LLM_PROVIDER` - Optional. `gemini` or `openrouter`. Defaults to `gemini`.
//! - `GEMINI_API_KEY` - Required when the provider is `gemini`.
//! - `OPENROUTER_API_KEY` - Required when the provider is `openrouter`.
//! - `DEFAULT_MODEL` - Optional. Model identifier. Defaults to `gemini-2.5-flash`
//!   (or `google/gemini-2.5-flash` for OpenRouter).
//! - `LLM_BASE_URL` - Optional. Overrides the provider endpoint base URL.
//! - `TEMPERATURE` - Optional. Sampling temperature. Defaults to `0.4`.
//! - `LLM_TIMEOUT_SECS` - Optional. Per-request timeout. Defaults to `120`.
//! - `MAX_ITERATIONS` - Optional. Maximum agent loop iterations per turn. Defaults to `10`.
//! - `HISTORY_LIMIT` - Optional. Turns kept in session history. Defaults to `50`.
//! - `TASKLIST_PATH` - Optional. Task file location. Defaults to `tasklist.txt`.
//! - `MAX_SESSIONS` - Optional. Web sessions kept in memory. Defaults to `100`.
//! - `SESSION_IDLE_SECS` - Optional. Idle time before a web session is dropped. Defaults to `3600`.
//! - `HOST` - Optional. Web server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Web server port. Defaults to `7860`.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.5-flash";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` endpoint (OpenRouter by default)
    OpenRouter,
}

impl LlmProvider {
    /// Environment variable holding this provider's API credential.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => DEFAULT_GEMINI_MODEL,
            LlmProvider::OpenRouter => DEFAULT_OPENROUTER_MODEL,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(LlmProvider::Gemini),
            "openrouter" | "openai" => Ok(LlmProvider::OpenRouter),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which hosted model API to talk to
    pub provider: LlmProvider,

    /// API credential for the provider
    pub api_key: String,

    /// Model identifier
    pub default_model: String,

    /// Optional endpoint override
    pub base_url: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout for a single model call, in seconds
    pub request_timeout_secs: u64,

    /// Maximum model round-trips per turn
    pub max_iterations: usize,

    /// Number of turns retained in a session history
    pub history_limit: usize,

    /// Web sessions kept in memory at once
    pub max_sessions: usize,

    /// Idle seconds after which a web session may be dropped
    pub session_idle_secs: u64,

    /// Task list file
    pub tasklist_path: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if the provider's API key is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = lookup("LLM_PROVIDER")
            .map(|v| {
                v.parse::<LlmProvider>()
                    .map_err(|e| ConfigError::InvalidValue("LLM_PROVIDER".to_string(), e))
            })
            .transpose()?
            .unwrap_or(LlmProvider::Gemini);

        let key_var = provider.api_key_var();
        let api_key = lookup(key_var)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(key_var.to_string()))?;

        let default_model =
            lookup("DEFAULT_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let base_url = lookup("LLM_BASE_URL");

        let temperature = parse_var(&lookup, "TEMPERATURE", "0.4")?;
        let request_timeout_secs = parse_var(&lookup, "LLM_TIMEOUT_SECS", "120")?;
        let max_iterations: usize = parse_var(&lookup, "MAX_ITERATIONS", "10")?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ITERATIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let history_limit = parse_var(&lookup, "HISTORY_LIMIT", "50")?;
        let max_sessions = parse_var(&lookup, "MAX_SESSIONS", "100")?;
        let session_idle_secs = parse_var(&lookup, "SESSION_IDLE_SECS", "3600")?;

        let tasklist_path = lookup("TASKLIST_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("tasklist.txt"));

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&lookup, "PORT", "7860")?;

        Ok(Self {
            provider,
            api_key,
            default_model,
            base_url,
            temperature,
            request_timeout_secs,
            max_iterations,
            history_limit,
            max_sessions,
            session_idle_secs,
            tasklist_path,
            host,
            port,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, tasklist_path: PathBuf) -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key,
            default_model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: None,
            temperature: 0.4,
            request_timeout_secs: 120,
            max_iterations: 10,
            history_limit: 50,
            max_sessions: 100,
            session_idle_secs: 3600,
            tasklist_path,
            host: "127.0.0.1".to_string(),
            port: 7860,
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn missing_gemini_key_is_reported_by_name() {
        match load(&[]) {
            Err(ConfigError::MissingEnvVar(var)) => assert_eq!(var, "GEMINI_API_KEY"),
            other => panic!("expected missing key, got {:?}", other),
        }
        assert!(matches!(
            load(&[("GEMINI_API_KEY", "   ")]),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn openrouter_requires_its_own_key() {
        let err = load(&[("LLM_PROVIDER", "openrouter"), ("GEMINI_API_KEY", "g")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref var) if var == "OPENROUTER_API_KEY"));

        let config = load(&[("LLM_PROVIDER", "openrouter"), ("OPENROUTER_API_KEY", "o")])
            .expect("config");
        assert_eq!(config.provider, LlmProvider::OpenRouter);
        assert_eq!(config.api_key, "o");
        assert_eq!(config.default_model, DEFAULT_OPENROUTER_MODEL);
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let config = load(&[("GEMINI_API_KEY", "k")]).expect("config");
        assert_eq!(config.provider, LlmProvider::Gemini);
        assert_eq!(config.default_model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.tasklist_path, PathBuf::from("tasklist.txt"));
        assert_eq!(config.port, 7860);
        assert_eq!(config.max_sessions, 100);
        assert_eq!(config.session_idle_secs, 3600);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err = load(&[("GEMINI_API_KEY", "k"), ("MAX_ITERATIONS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "MAX_ITERATIONS"));
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        let err = load(&[("GEMINI_API_KEY", "k"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "PORT"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = load(&[("LLM_PROVIDER", "bedrock"), ("GEMINI_API_KEY", "k")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref var, _) if var == "LLM_PROVIDER"));
    }

    #[test]
    fn provider_parses_aliases() {
        assert_eq!("Gemini".parse::<LlmProvider>(), Ok(LlmProvider::Gemini));
        assert_eq!(" openrouter ".parse::<LlmProvider>(), Ok(LlmProvider::OpenRouter));
        assert!("bedrock".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn provider_names_its_credential() {
        assert_eq!(LlmProvider::Gemini.api_key_var(), "GEMINI_API_KEY");
        assert_eq!(LlmProvider::OpenRouter.api_key_var(), "OPENROUTER_API_KEY");
    }

    #[test]
    fn test_config_uses_documented_defaults() {
        let config = Config::new("key".to_string(), PathBuf::from("tasks.txt"));
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert!((config.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.history_limit, 50);
    }
}
