//! Maps parsed CLI arguments to the [`Action`] to run.

use crate::cli::actions::{date, routing, session, Action};
use crate::cli::commands::{
    ARG_DATA, ARG_DOB, ARG_FORMAT, ARG_FULL_NAME, ARG_HEADER, ARG_INTERVAL, ARG_METHOD,
    ARG_PASSWORD, ARG_PATH, ARG_QUALIFICATION, ARG_USERNAME, ARG_VALUE, ARG_WATCH,
};
use crate::cli::globals::GlobalArgs;
use crate::session::Registration;
use anyhow::{anyhow, Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use secrecy::SecretString;
use std::time::Duration;

fn required(matches: &clap::ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: {id}"))
}

/// Parses repeated `Name: value` header arguments.
fn parse_headers<'a>(raw: impl IntoIterator<Item = &'a String>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .with_context(|| format!("header must look like 'Name: value': {entry}"))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("invalid header name: {name}"))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("invalid value for header {name}"))?;
        headers.append(name, value);
    }
    Ok(headers)
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("no subcommand given"))?;
    let globals = GlobalArgs::parse(sub);

    let action = match name {
        "login" => Action::Login(session::LoginArgs {
            globals,
            username: required(sub, ARG_USERNAME)?,
            password: SecretString::from(required(sub, ARG_PASSWORD)?),
        }),
        "register" => Action::Register(session::RegisterArgs {
            globals,
            registration: Registration {
                username: required(sub, ARG_USERNAME)?,
                password: SecretString::from(required(sub, ARG_PASSWORD)?),
                full_name: required(sub, ARG_FULL_NAME)?,
                qualification: required(sub, ARG_QUALIFICATION)?,
                dob: required(sub, ARG_DOB)?,
            },
        }),
        "logout" => Action::Logout(globals),
        "status" => Action::Status(session::StatusArgs {
            globals,
            watch: sub.get_flag(ARG_WATCH),
            interval: Duration::from_secs(
                sub.get_one::<u64>(ARG_INTERVAL).copied().unwrap_or(2),
            ),
        }),
        "request" => {
            let method = required(sub, ARG_METHOD)?.to_uppercase();
            let body = sub
                .get_one::<String>(ARG_DATA)
                .map(|raw| {
                    serde_json::from_str::<serde_json::Value>(raw)
                        .context("--data must be valid JSON")
                })
                .transpose()?;

            Action::Request(session::RequestArgs {
                globals,
                method: Method::from_bytes(method.as_bytes())
                    .with_context(|| format!("invalid HTTP method: {method}"))?,
                path: required(sub, ARG_PATH)?,
                headers: parse_headers(sub.get_many::<String>(ARG_HEADER).into_iter().flatten())?,
                body,
            })
        }
        "navigate" => Action::Navigate(routing::NavigateArgs {
            globals,
            path: required(sub, ARG_PATH)?,
        }),
        "routes" => Action::Routes,
        "date" => Action::Date(date::Args {
            value: required(sub, ARG_VALUE)?,
            format: date::Format::parse(&required(sub, ARG_FORMAT)?)?,
        }),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}
