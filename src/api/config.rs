//! Client configuration for the storefront API. Values are public; do not store
//! secrets here.

use super::errors::ApiError;
use std::time::Duration;
use url::Url;

/// Production API used by the storefront when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://3dprinter-web-api.benhalverson.workers.dev";
/// Default request timeout (milliseconds) applied to every API call.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiConfig {
    /// Builds a config from a base URL string, normalizing surrounding whitespace
    /// and trailing slashes.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the URL is empty, unparsable or not HTTP(S).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        Ok(Self {
            base_url,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: crate::APP_USER_AGENT.to_string(),
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

fn parse_base_url(value: &str) -> Result<Url, ApiError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ApiError::Config("API base URL is empty.".to_string()));
    }

    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::Config(format!("Invalid API base URL {trimmed}: {err}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::Config(format!(
            "Unsupported API base URL scheme: {scheme}"
        ))),
    }
}
