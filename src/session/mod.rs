//! Auth session handling: the per-view session controller, its in-memory
//! state, and the broadcaster that keeps independently mounted sessions in
//! agreement. This module touches security boundaries and must never log
//! tokens or passwords.
//!
//! Flow overview: mounting a session reads the stored credentials and asks the
//! server whether the token is still accepted. Login stores the new credentials
//! and publishes the transition; logout and any `401` clear them. Sibling
//! sessions mirror published transitions and re-check when the stored record
//! changes underneath them.

mod broadcaster;
mod controller;
mod state;
mod types;

pub use broadcaster::{
    AuthBroadcaster, AuthEvent, Envelope, Received, Subscription, AUTH_STATE_CHANGED,
};
pub use controller::{AuthSession, RequestOptions, SessionContext};
pub use state::{SessionState, UserProfile};
pub use types::{AuthOutcome, Registration, TokenStatus};
