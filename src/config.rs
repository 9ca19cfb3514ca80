//! Client configuration for the API endpoint, token verification probe and
//! credential storage. Values come from CLI flags or their `QUIZGATE_*`
//! environment variables; nothing here is secret.

use std::{path::PathBuf, time::Duration};

/// Backend used when no API URL is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
/// Endpoint probed to confirm the server still accepts a token.
pub const DEFAULT_VERIFY_PATH: &str = "/available-quizzes";
/// Per-request timeout applied to every HTTP call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Credential file location relative to `$HOME`.
const DEFAULT_STORE_FILE: &str = ".quizgate/credentials.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub verify_path: String,
    pub timeout: Duration,
    pub store_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            verify_path: DEFAULT_VERIFY_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            store_path: default_store_path(),
        }
    }
}

impl ClientConfig {
    /// Returns a copy pointing at another API base URL.
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_verify_path(mut self, path: impl Into<String>) -> Self {
        if let Some(path) = normalize_value(&path.into()) {
            self.verify_path = path;
        }
        self
    }

    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

/// Resolves `$HOME/.quizgate/credentials.json`, falling back to the working directory.
#[must_use]
pub fn default_store_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_STORE_FILE),
        _ => PathBuf::from(DEFAULT_STORE_FILE),
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
