//! JSON helpers over a single `reqwest` client. Feature clients use these helpers
//! so request setup, the timeout policy and error mapping stay identical across
//! auth and catalog calls. Cookies are kept in the client's jar and only sent to
//! the configured base URL.

use super::{config::ApiConfig, errors::ApiError};
use reqwest::{
    cookie::{CookieStore, Jar},
    Client, Method, RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info_span, Instrument};
use url::Url;

/// Maximum number of characters kept from the `error` field of an error body.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl ApiClient {
    /// Builds a client with a fresh cookie jar.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    /// Builds a client around an existing cookie jar.
    ///
    /// # Errors
    /// Returns [`ApiError::Config`] if the underlying HTTP client cannot be built.
    pub fn with_jar(config: &ApiConfig, jar: Arc<Jar>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            jar,
            base_url: config.base_url.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `Cookie` header value the jar would send to the API, if any.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().ok().map(ToString::to_string))
    }

    /// Loads `name=value` pairs from a saved `Cookie` header back into the jar.
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base_url);
        }
    }

    /// Fetches JSON with the session cookies attached.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on transport failures, non-2xx statuses or undecodable bodies.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path);
        let response = self.send("GET", path, request).await?;
        handle_json_response(response).await
    }

    /// Fetches JSON with query parameters appended to the path.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on transport failures, non-2xx statuses or undecodable bodies.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path).query(query);
        let response = self.send("GET", path, request).await?;
        handle_json_response(response).await
    }

    /// Issues a GET whose response body is irrelevant to the caller.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on transport failures or non-2xx statuses.
    pub async fn get_empty(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::GET, path);
        let response = self.send("GET", path, request).await?;
        handle_empty_response(response).await
    }

    /// Posts a JSON body and parses a JSON response.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if encoding fails, on transport failures, non-2xx
    /// statuses or undecodable bodies.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path).json(&encode(body)?);
        let response = self.send("POST", path, request).await?;
        handle_json_response(response).await
    }

    /// Posts a JSON body; any 2xx succeeds and the response body is ignored.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if encoding fails, on transport failures or non-2xx statuses.
    pub async fn post_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let request = self.request(Method::POST, path).json(&encode(body)?);
        let response = self.send("POST", path, request).await?;
        handle_empty_response(response).await
    }

    /// Puts a JSON body and parses a JSON response.
    ///
    /// # Errors
    /// Returns an [`ApiError`] if encoding fails, on transport failures, non-2xx
    /// statuses or undecodable bodies.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PUT, path).json(&encode(body)?);
        let response = self.send("PUT", path, request).await?;
        handle_json_response(response).await
    }

    /// Deletes a resource and parses the JSON acknowledgement.
    ///
    /// # Errors
    /// Returns an [`ApiError`] on transport failures, non-2xx statuses or undecodable bodies.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::DELETE, path);
        let response = self.send("DELETE", path, request).await?;
        handle_json_response(response).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, build_url_with_base(self.base_url.as_str(), path))
    }

    async fn send(
        &self,
        method: &'static str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let span = info_span!("api.request", http.method = method, path = %path);
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!(method, path, status = response.status().as_u16(), "API response");

        Ok(response)
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Encodes request bodies up front so serialization problems are reported as such
/// instead of surfacing as transport errors.
fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))
}

/// Maps transport errors into `ApiError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Parses JSON responses and surfaces HTTP errors with the server's message.
async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), ApiError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    ApiError::Http {
        status,
        message: error_message(&value),
        error: error_detail(&value),
    }
}

/// The `message` field of a JSON error body, verbatim. Empty counts as absent.
fn error_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(ToString::to_string)
}

/// The `error` field of a JSON error body, trimmed and truncated for display.
fn error_detail(value: &Value) -> Option<String> {
    let detail = value.get("error").and_then(Value::as_str)?.trim();
    if detail.is_empty() {
        None
    } else {
        Some(detail.chars().take(MAX_ERROR_CHARS).collect())
    }
}
