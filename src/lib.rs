//! # Quizgate (session and routing client)
//!
//! `quizgate` is the client-side session layer of the quiz management
//! platform. It logs users in and out against the REST backend, persists the
//! resulting credentials, keeps every mounted session in agreement through an
//! explicit publish/subscribe channel, and gates navigation with a static route
//! table.
//!
//! ## Credentials
//!
//! The credential record is a `token` plus a `userRole`, stored through a
//! [`store::CredentialStore`]. The record is overwritten wholesale on login and
//! cleared wholesale on logout or on any `401` from an authenticated request.
//!
//! ## Sessions
//!
//! An [`session::AuthSession`] derives `isLoggedIn`/`isAdmin` flags from the
//! record and a server verification call. Transitions are published on an
//! [`session::AuthBroadcaster`] so sibling sessions mirror them.
//!
//! ## Routing
//!
//! The [`router::Router`] guard reads the record synchronously before every
//! navigation. It is a UX gate only: authorization is enforced by the server on
//! every request.

pub mod api;
pub mod cli;
pub mod config;
pub mod dates;
pub mod router;
pub mod session;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
