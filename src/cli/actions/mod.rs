pub mod date;
pub mod routing;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Register(session::RegisterArgs),
    Logout(GlobalArgs),
    Status(session::StatusArgs),
    Request(session::RequestArgs),
    Navigate(routing::NavigateArgs),
    Routes,
    Date(date::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// Results go to stdout as pretty JSON; logs stay on stderr.
fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
