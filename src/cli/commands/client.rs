use crate::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_VERIFY_PATH};
use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_STORE: &str = "store";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_VERIFY_PATH: &str = "verify-path";

/// Options shared by every subcommand.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long(ARG_API_URL)
                .help("Base URL of the quiz API")
                .default_value(DEFAULT_API_URL)
                .env("QUIZGATE_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_STORE)
                .long(ARG_STORE)
                .help("Credential file (default: $HOME/.quizgate/credentials.json)")
                .env("QUIZGATE_STORE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help(format!("Request timeout in seconds (default: {DEFAULT_TIMEOUT_SECS})"))
                .env("QUIZGATE_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_VERIFY_PATH)
                .long(ARG_VERIFY_PATH)
                .help(format!(
                    "Authenticated endpoint used to verify the stored token (default: {DEFAULT_VERIFY_PATH})"
                ))
                .env("QUIZGATE_VERIFY_PATH")
                .global(true),
        )
}
