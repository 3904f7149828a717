use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
    default_on_request_failure, policies::ExponentialBackoff, Retryable, RetryableStrategy,
    RetryTransientMiddleware,
};
use serde::Serialize;
use serde_json::Value;

use crate::extract::extract_text;
use crate::provider::{Completion, CompletionClient, CompletionError, Result};

const DEFAULT_BASE_URL: &str = "https://api.cohere.ai";
const DEFAULT_MODEL: &str = "command";
const DEFAULT_MAX_TOKENS: u32 = 350;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_TRUNCATE: &str = "END";

/// Request parameters that stay fixed for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Upper bound for the whole call, retries included.
    pub timeout: Duration,
    /// Extra attempts after a transient failure. Zero disables retrying.
    pub max_retries: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
        }
    }
}

impl CompletionSettings {
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    truncate: &'a str,
}

/// Retries 5xx responses and transport failures. Every 4xx, including 408 and
/// 429, is returned on the first attempt.
struct ServerErrorsOnly;

impl RetryableStrategy for ServerErrorsOnly {
    fn handle(
        &self,
        res: &std::result::Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) if response.status().is_server_error() => Some(Retryable::Transient),
            Ok(response) if response.status().is_client_error() => Some(Retryable::Fatal),
            Ok(_) => None,
            Err(err) => default_on_request_failure(err),
        }
    }
}

/// Client for the Cohere `generate` endpoint.
pub struct CohereProvider {
    client: ClientWithMiddleware,
    settings: CompletionSettings,
}

impl fmt::Debug for CohereProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohereProvider")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CohereProvider {
    pub fn new(api_key: &str, settings: CompletionSettings) -> Result<Self> {
        let client = Self::build_http_client(api_key, settings.timeout)?;
        let client = Self::build_retry_client(client, settings.max_retries);

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    fn build_http_client(api_key: &str, timeout: Duration) -> Result<Client> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| CompletionError::Setup("API key is not a valid header value".into()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Setup(format!("failed to build HTTP client: {e}")))
    }

    fn build_retry_client(client: Client, max_retries: u32) -> ClientWithMiddleware {
        if max_retries == 0 {
            return ClientBuilder::new(client).build();
        }

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(250), Duration::from_secs(4))
            .build_with_max_retries(max_retries);

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy_and_strategy(
                retry_policy,
                ServerErrorsOnly,
            ))
            .build()
    }

    fn generate_url(&self) -> String {
        format!("{}/generate", self.settings.base_url)
    }

    async fn send(&self, prompt: &str) -> Result<Value> {
        let body = GenerateRequest {
            model: &self.settings.model,
            prompt,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            truncate: DEFAULT_TRUNCATE,
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::api(status.as_u16(), &text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn map_transport_error(&self, err: reqwest_middleware::Error) -> CompletionError {
        match err {
            reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => {
                CompletionError::Timeout(self.settings.timeout)
            }
            reqwest_middleware::Error::Reqwest(e) => CompletionError::Http(e.to_string()),
            reqwest_middleware::Error::Middleware(e) => CompletionError::Http(e.to_string()),
        }
    }
}

#[async_trait]
impl CompletionClient for CohereProvider {
    async fn complete(&self, prompt: &str) -> Result<Completion> {
        log::debug!(
            "Sending prompt to {} (model: {}, max_tokens: {})",
            self.settings.base_url,
            self.settings.model,
            self.settings.max_tokens
        );

        let response = tokio::time::timeout(self.settings.timeout, self.send(prompt))
            .await
            .map_err(|_| CompletionError::Timeout(self.settings.timeout))??;

        Ok(extract_text(&response))
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}
