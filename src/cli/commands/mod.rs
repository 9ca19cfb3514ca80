pub mod client;
pub mod logging;

use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        PossibleValuesParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_USERNAME: &str = "username";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_FULL_NAME: &str = "full-name";
pub const ARG_QUALIFICATION: &str = "qualification";
pub const ARG_DOB: &str = "dob";
pub const ARG_WATCH: &str = "watch";
pub const ARG_INTERVAL: &str = "interval";
pub const ARG_METHOD: &str = "method";
pub const ARG_PATH: &str = "path";
pub const ARG_HEADER: &str = "header";
pub const ARG_DATA: &str = "data";
pub const ARG_VALUE: &str = "value";
pub const ARG_FORMAT: &str = "format";

fn password_arg() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long(ARG_PASSWORD)
        .help("Account password")
        .env("QUIZGATE_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

fn username_arg() -> Arg {
    Arg::new(ARG_USERNAME)
        .help("Account username (email)")
        .required(true)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("quizgate")
        .about("Quiz platform session client")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("login")
                .about("Log in and store the granted credentials")
                .arg(username_arg())
                .arg(password_arg()),
        )
        .subcommand(
            Command::new("register")
                .about("Create an account (does not log in)")
                .arg(username_arg())
                .arg(password_arg())
                .arg(
                    Arg::new(ARG_FULL_NAME)
                        .long(ARG_FULL_NAME)
                        .help("Full name")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_QUALIFICATION)
                        .long(ARG_QUALIFICATION)
                        .help("Highest qualification")
                        .required(true),
                )
                .arg(
                    Arg::new(ARG_DOB)
                        .long(ARG_DOB)
                        .help("Date of birth, YYYY-MM-DD")
                        .required(true),
                ),
        )
        .subcommand(Command::new("logout").about("Clear the stored credentials"))
        .subcommand(
            Command::new("status")
                .about("Verify the stored credentials against the server")
                .arg(
                    Arg::new(ARG_WATCH)
                        .short('w')
                        .long(ARG_WATCH)
                        .help("Keep running and re-check whenever the credential file changes")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new(ARG_INTERVAL)
                        .long(ARG_INTERVAL)
                        .help("Credential file poll interval in seconds when watching")
                        .default_value("2")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(
            Command::new("request")
                .about("Send an authenticated request")
                .arg(
                    Arg::new(ARG_METHOD)
                        .help("HTTP method")
                        .required(true)
                        .ignore_case(true)
                        .value_parser(PossibleValuesParser::new([
                            "GET", "POST", "PUT", "PATCH", "DELETE",
                        ])),
                )
                .arg(Arg::new(ARG_PATH).help("API path, e.g. /my-scores").required(true))
                .arg(
                    Arg::new(ARG_HEADER)
                        .short('H')
                        .long(ARG_HEADER)
                        .help("Extra header as 'Name: value' (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new(ARG_DATA)
                        .short('d')
                        .long(ARG_DATA)
                        .help("JSON request body"),
                ),
        )
        .subcommand(
            Command::new("navigate")
                .about("Resolve a client route against the stored credentials")
                .arg(Arg::new(ARG_PATH).help("Route path, e.g. /admin/dashboard").required(true)),
        )
        .subcommand(Command::new("routes").about("List the route table"))
        .subcommand(
            Command::new("date")
                .about("Format a timestamp in GMT and IST")
                .arg(Arg::new(ARG_VALUE).help("Timestamp to format").required(true))
                .arg(
                    Arg::new(ARG_FORMAT)
                        .short('f')
                        .long(ARG_FORMAT)
                        .help("Output format")
                        .default_value("date-time")
                        .value_parser(PossibleValuesParser::new([
                            "date-time",
                            "date",
                            "quiz",
                            "ago",
                        ])),
                ),
        );

    let command = client::with_args(command);
    logging::with_args(command)
}
