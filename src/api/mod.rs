//! HTTP helpers for the platform's JSON API with a fixed timeout and
//! cancellation on every call. Status interpretation is left to callers: a
//! `401` means something different for `/login` than for an authenticated
//! request. The helpers attach bearer tokens handed to them but never log them.

mod errors;

pub use errors::ApiError;

use crate::{config::ClientConfig, APP_USER_AGENT};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

/// Maximum number of error body characters surfaced to users.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let base_url = validate_base_url(&config.api_base_url)?;
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            timeout: config.timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Joins the base URL and `path`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    /// Sends `request`, giving up after the configured timeout or when `cancel` fires.
    ///
    /// # Errors
    /// Returns an error on transport failure, timeout or cancellation. HTTP error
    /// statuses are returned as responses.
    pub async fn send(
        &self,
        request: RequestBuilder,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        tokio::select! {
            () = cancel.cancelled() => Err(ApiError::Cancelled),
            result = timeout(self.timeout, request.send()) => match result {
                Ok(Ok(response)) => {
                    debug!(status = response.status().as_u16(), url = %response.url(), "response received");
                    Ok(response)
                }
                Ok(Err(err)) => Err(map_request_error(&err)),
                Err(_) => Err(ApiError::Timeout("Request timed out. Please try again.".to_string())),
            },
        }
    }

    /// Posts a JSON body without authentication.
    ///
    /// # Errors
    /// See [`ApiClient::send`].
    #[instrument(skip(self, body, cancel))]
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        let request = self.request(Method::POST, path).json(body);
        self.send(request, cancel).await
    }

    /// Issues a bearer-authenticated GET.
    ///
    /// # Errors
    /// See [`ApiClient::send`].
    #[instrument(skip(self, token, cancel))]
    pub async fn get_with_bearer(
        &self,
        path: &str,
        token: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        let request = self
            .request(Method::GET, path)
            .headers(bearer_headers(token)?);
        self.send(request, cancel).await
    }
}

/// `Authorization: Bearer <token>` plus a JSON content type.
///
/// # Errors
/// Returns an error if the token contains bytes not allowed in a header.
pub fn bearer_headers(token: &SecretString) -> Result<HeaderMap, ApiError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
        .map_err(|_| ApiError::Serialization("Token is not a valid header value.".to_string()))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Extracts the server's `{"error": "..."}` message, if any.
pub async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|parsed| parsed.error)
        .map(sanitize_body)
}

/// Decodes a successful JSON response body.
///
/// # Errors
/// Returns an error if the body cannot be read or decoded as `T`.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
}

fn validate_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| ApiError::Config(format!("Invalid API URL {trimmed:?}: {err}")))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ApiError::Config(format!(
                "Unsupported API URL scheme: {scheme}"
            )))
        }
    }

    if url.host().is_none() {
        return Err(ApiError::Config("API URL has no host".to_string()));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
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

fn map_request_error(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        ApiError::Serialization(format!("Failed to build request: {err}"))
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Trims and truncates server messages before they reach users.
fn sanitize_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
