use super::routes::RouteMeta;
use crate::store::CredentialRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Pre-navigation check against the stored credentials.
///
/// This trusts whatever the client has stored and never asks the server, so it
/// only decides what to show. Every API call is still authorized server-side.
#[must_use]
pub fn before_each(meta: RouteMeta, record: &CredentialRecord) -> GuardDecision {
    if meta.requires_auth && !record.has_token() {
        GuardDecision::Redirect("/login")
    } else if meta.requires_admin && !record.is_admin() {
        GuardDecision::Redirect("/")
    } else {
        GuardDecision::Proceed
    }
}
