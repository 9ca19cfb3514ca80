use crate::cli::commands::client::{ARG_API_URL, ARG_STORE, ARG_TIMEOUT, ARG_VERIFY_PATH};
use crate::config::ClientConfig;
use crate::store::FileStore;
use anyhow::{Context, Result};
use std::{sync::Arc, time::Duration};

/// Options every subcommand shares, resolved into a [`ClientConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    pub config: ClientConfig,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn parse(matches: &clap::ArgMatches) -> Self {
        let mut config = ClientConfig::default();

        if let Some(url) = matches.get_one::<String>(ARG_API_URL) {
            config = config.with_api_base_url(url.as_str());
        }
        if let Some(path) = matches.get_one::<String>(ARG_STORE) {
            config = config.with_store_path(path.as_str());
        }
        if let Some(secs) = matches.get_one::<u64>(ARG_TIMEOUT) {
            config = config.with_timeout(Duration::from_secs(*secs));
        }
        if let Some(path) = matches.get_one::<String>(ARG_VERIFY_PATH) {
            config = config.with_verify_path(path.as_str());
        }

        Self { config }
    }

    /// Opens the credential file named by `--store`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn open_store(&self) -> Result<Arc<FileStore>> {
        let store = FileStore::open(&self.config.store_path).with_context(|| {
            format!(
                "failed to open credential store {}",
                self.config.store_path.display()
            )
        })?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use std::path::PathBuf;

    #[test]
    fn test_global_args() {
        temp_env::with_vars(
            [
                ("QUIZGATE_API_URL", None::<&str>),
                ("QUIZGATE_STORE", None),
                ("QUIZGATE_TIMEOUT", None),
                ("QUIZGATE_VERIFY_PATH", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "quizgate",
                    "--api-url",
                    "https://quiz.example.com",
                    "--store",
                    "/tmp/creds.json",
                    "--timeout",
                    "4",
                    "routes",
                ]);
                let globals = GlobalArgs::parse(&matches);
                assert_eq!(globals.config.api_base_url, "https://quiz.example.com");
                assert_eq!(globals.config.store_path, PathBuf::from("/tmp/creds.json"));
                assert_eq!(globals.config.timeout, Duration::from_secs(4));
                assert_eq!(globals.config.verify_path, "/available-quizzes");
            },
        );
    }

    #[test]
    fn test_defaults_without_flags() {
        temp_env::with_vars(
            [
                ("QUIZGATE_API_URL", None::<&str>),
                ("QUIZGATE_STORE", None),
                ("QUIZGATE_TIMEOUT", None),
                ("QUIZGATE_VERIFY_PATH", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["quizgate", "routes"]);
                assert_eq!(GlobalArgs::parse(&matches), GlobalArgs::new(ClientConfig::default()));
            },
        );
    }
}
