use crate::cli::actions::{date, routing, session, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => session::login(args).await,
        Action::Register(args) => session::register(args).await,
        Action::Logout(globals) => session::logout(&globals),
        Action::Status(args) => session::status(args).await,
        Action::Request(args) => session::request(args).await,
        Action::Navigate(args) => routing::navigate(&args),
        Action::Routes => routing::routes(),
        Action::Date(args) => date::execute(&args),
    }
}
