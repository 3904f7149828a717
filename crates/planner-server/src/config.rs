//! Process configuration.
//!
//! Everything comes from flags or the environment (a `.env` file is loaded
//! first by `main`). Nothing here has a baked-in credential or origin.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Args, ValueEnum};
use planner_llm::CompletionSettings;
use thiserror::Error;

use crate::cors::CorsPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("default CORS origin must be a concrete origin, got '{0}'")]
    InvalidDefaultOrigin(String),

    #[error("'*' is not allowed in the CORS allow-list when credentials are allowed")]
    WildcardOrigin,

    #[error("API key must not be empty")]
    EmptyApiKey,

    #[error("completion timeout must be greater than zero")]
    ZeroTimeout,
}

/// Completion service credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl FromStr for ApiKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Args, Debug, Clone)]
pub struct PlannerArgs {
    /// Completion service API key
    #[arg(long, env = "COHERE_API_KEY", hide_env_values = true)]
    pub api_key: ApiKey,

    /// Completion service base URL
    #[arg(long, env = "COMPLETION_BASE_URL", default_value = "https://api.cohere.ai")]
    pub completion_base_url: String,

    /// Completion model name
    #[arg(long, env = "COMPLETION_MODEL", default_value = "command")]
    pub completion_model: String,

    /// Maximum tokens generated per plan
    #[arg(long, env = "COMPLETION_MAX_TOKENS", default_value_t = 350)]
    pub completion_max_tokens: u32,

    /// Sampling temperature
    #[arg(long, env = "COMPLETION_TEMPERATURE", default_value_t = 0.7)]
    pub completion_temperature: f32,

    /// Hard timeout for one completion call, retries included
    #[arg(long, env = "COMPLETION_TIMEOUT_SECS", default_value_t = 30)]
    pub completion_timeout_secs: u64,

    /// Extra attempts on 5xx or timeout (0 disables retries)
    #[arg(long, env = "COMPLETION_MAX_RETRIES", default_value_t = 0)]
    pub completion_max_retries: u32,

    /// Comma-separated origins whose requests are answered with their own origin
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub cors_allowed_origins: Vec<String>,

    /// Origin returned to requests from origins outside the allow-list
    #[arg(long, env = "CORS_DEFAULT_ORIGIN")]
    pub cors_default_origin: String,

    /// Record store backend
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value = "sqlite")]
    pub store_backend: StoreBackend,

    /// SQLite database file
    #[arg(long, env = "STORE_PATH", default_value = "travel_plans.db")]
    pub store_path: PathBuf,

    /// Table holding travel plan records
    #[arg(long, env = "STORE_TABLE", default_value = "TravelPlans")]
    pub store_table: String,

    /// Replace newlines in returned plans with <br>
    #[arg(long, env = "HTML_LINE_BREAKS", default_value_t = true, action = ArgAction::Set)]
    pub html_line_breaks: bool,
}

impl PlannerArgs {
    pub fn completion_settings(&self) -> Result<CompletionSettings, ConfigError> {
        if self.completion_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(CompletionSettings::default()
            .with_base_url(&self.completion_base_url)
            .with_model(&self.completion_model)
            .with_max_tokens(self.completion_max_tokens)
            .with_temperature(self.completion_temperature)
            .with_timeout(Duration::from_secs(self.completion_timeout_secs))
            .with_max_retries(self.completion_max_retries))
    }

    pub fn cors_policy(&self) -> Result<CorsPolicy, ConfigError> {
        CorsPolicy::new(&self.cors_default_origin, &self.cors_allowed_origins)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        planner: PlannerArgs,
    }

    fn parse(extra: &[&str]) -> PlannerArgs {
        let mut argv = vec![
            "planner",
            "--api-key",
            "test-key",
            "--cors-default-origin",
            "https://app.example.com",
        ];
        argv.extend_from_slice(extra);
        TestCli::try_parse_from(argv).expect("valid args").planner
    }

    #[test]
    fn defaults_follow_completion_contract() {
        let args = parse(&["--completion-base-url", "https://api.cohere.ai"]);
        let settings = args.completion_settings().unwrap();

        assert_eq!(settings.model, "command");
        assert_eq!(settings.max_tokens, 350);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.max_retries, 0);
        assert!(args.html_line_breaks);
        assert_eq!(args.store_table, "TravelPlans");
    }

    #[test]
    fn allowed_origins_split_on_commas() {
        let args = parse(&[
            "--cors-allowed-origins",
            "https://a.example,http://localhost:5173",
        ]);
        let policy = args.cors_policy().unwrap();

        assert_eq!(policy.allowed_origins().len(), 2);
        assert_eq!(
            policy.allow_origin(Some("http://localhost:5173")),
            "http://localhost:5173"
        );
    }

    #[test]
    fn line_breaks_can_be_disabled() {
        let args = parse(&["--html-line-breaks", "false"]);
        assert!(!args.html_line_breaks);
    }

    #[test]
    fn memory_backend_is_selectable() {
        let args = parse(&["--store-backend", "memory"]);
        assert_eq!(args.store_backend, StoreBackend::Memory);
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let args = parse(&["--completion-timeout-secs", "0"]);
        assert!(matches!(
            args.completion_settings(),
            Err(ConfigError::ZeroTimeout)
        ));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let args = parse(&[]);
        let debug = format!("{args:?}");
        assert!(!debug.contains("test-key"));
        assert!(debug.contains("ApiKey(***)"));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(matches!("  ".parse::<ApiKey>(), Err(ConfigError::EmptyApiKey)));
    }
}
