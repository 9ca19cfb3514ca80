use crate::cli::{actions::print_json, globals::GlobalArgs};
use crate::session::{AuthSession, Registration, RequestOptions, SessionContext};
use crate::store::{CredentialStore, FileStore};
use anyhow::{anyhow, bail, Result};
use reqwest::{header::HeaderMap, Method};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub globals: GlobalArgs,
    pub registration: Registration,
}

#[derive(Debug)]
pub struct StatusArgs {
    pub globals: GlobalArgs,
    pub watch: bool,
    pub interval: Duration,
}

#[derive(Debug)]
pub struct RequestArgs {
    pub globals: GlobalArgs,
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

fn context(globals: &GlobalArgs, store: Arc<FileStore>) -> Result<SessionContext> {
    Ok(SessionContext::from_config(&globals.config, store)?)
}

fn summary(session: &AuthSession) -> Value {
    json!({
        "session": session.state(),
        "location": session.router().current(),
    })
}

/// # Errors
/// Returns an error if the store cannot be opened or the login is refused.
pub async fn login(args: LoginArgs) -> Result<()> {
    let store = args.globals.open_store()?;
    let session = AuthSession::new(context(&args.globals, store)?);

    let outcome = session.login(&args.username, &args.password).await;
    if outcome.success {
        // `/` resolves to the landing page for the stored role
        session.router().push("/")?;
    }

    print_json(&json!({ "outcome": outcome, "status": summary(&session) }))?;

    match outcome.error {
        Some(error) if !outcome.success => bail!(error),
        _ => Ok(()),
    }
}

/// # Errors
/// Returns an error if the store cannot be opened or the server refuses the account.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let store = args.globals.open_store()?;
    let session = AuthSession::new(context(&args.globals, store)?);

    let outcome = session.register(&args.registration).await;
    print_json(&outcome)?;

    match outcome.error {
        Some(error) if !outcome.success => bail!(error),
        _ => Ok(()),
    }
}

/// # Errors
/// Returns an error if the store cannot be opened.
pub fn logout(globals: &GlobalArgs) -> Result<()> {
    let store = globals.open_store()?;
    let session = AuthSession::new(context(globals, store)?);

    session.logout();
    print_json(&summary(&session))
}

/// # Errors
/// Returns an error if the store cannot be opened.
pub async fn status(args: StatusArgs) -> Result<()> {
    let store = args.globals.open_store()?;
    let session = AuthSession::new(context(&args.globals, store.clone())?);

    session.check_auth().await;
    print_json(&summary(&session))?;

    if !args.watch {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let poller = store.clone().watch_file(args.interval, cancel.clone());
    let mut changes = store.watch();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!(path = %store.path().display(), "watching credential file");
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                changes.borrow_and_update();
                debug!("credential file changed, re-checking");
                session.check_auth().await;
                print_json(&summary(&session))?;
            }
        }
    }

    cancel.cancel();
    session.unmount();
    poller.await?;
    Ok(())
}

/// # Errors
/// Returns an error if the store cannot be opened, the session has expired or
/// the server cannot be reached.
pub async fn request(args: RequestArgs) -> Result<()> {
    let store = args.globals.open_store()?;
    let session = AuthSession::new(context(&args.globals, store.clone())?);

    let options = RequestOptions {
        headers: args.headers,
        body: args.body,
    };
    let response = session
        .make_authenticated_request(args.method, &args.path, options)
        .await
        .ok_or_else(|| {
            // a 401 clears the stored token, a transport failure leaves it
            if store.load().has_token() {
                anyhow!("request to {} failed: server unreachable", args.path)
            } else {
                anyhow!("not logged in or session expired; run `quizgate login` first")
            }
        })?;

    let status = response.status().as_u16();
    let text = response.text().await?;
    let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

    print_json(&json!({ "status": status, "body": body }))
}
