//! The global `-v`/`--verbose` option, also read from `QUIZGATE_LOG_LEVEL`,
//! controlling how much quizgate logs to stderr.

use clap::{builder::ValueParser, Arg, Command};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ENV_LOG_LEVEL: &str = "QUIZGATE_LOG_LEVEL";

/// Level names in verbosity order; the index is the level's number.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

fn parse_log_level(level: &str) -> Result<u8, String> {
    if let Ok(parsed) = level.parse::<u8>() {
        if parsed <= 5 {
            return Ok(parsed);
        }
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(level.trim()))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {level}"))
}

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(parse_log_level)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env(ENV_LOG_LEVEL)
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
