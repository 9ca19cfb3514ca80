//! Persistent credential storage. The record mirrors the two well-known keys the
//! platform has always used (`token` and `userRole`) and is replaced or cleared
//! as a whole. Every store publishes its current record on a watch channel so
//! sessions can react to changes made by someone else.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tokio::sync::watch;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the role string returned at login.
pub const ROLE_KEY: &str = "userRole";

const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credential store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Anything other than the exact string `"admin"` is a regular user.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == ADMIN_ROLE {
            Self::Admin
        } else {
            Self::User
        }
    }

    /// Landing page after a successful login.
    #[must_use]
    pub const fn landing_path(self) -> &'static str {
        match self {
            Self::Admin => "/admin/dashboard",
            Self::User => "/dashboard",
        }
    }
}

/// The persisted `token` + `userRole` pair.
#[derive(Clone, Default)]
pub struct CredentialRecord {
    token: Option<SecretString>,
    user_role: Option<String>,
}

impl CredentialRecord {
    #[must_use]
    pub fn new(token: impl Into<String>, user_role: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            user_role: Some(user_role.into()),
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().is_empty())
    }

    #[must_use]
    pub fn user_role(&self) -> Option<&str> {
        self.user_role.as_deref()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.user_role
            .as_deref()
            .map_or(Role::User, Role::from_stored)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user_role.is_none()
    }

    pub(crate) fn to_persisted(&self) -> PersistedRecord {
        PersistedRecord {
            token: self
                .token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            user_role: self.user_role.clone(),
        }
    }

    pub(crate) fn from_persisted(record: PersistedRecord) -> Self {
        Self {
            token: record.token.map(SecretString::from),
            user_role: record.user_role,
        }
    }

    /// True when both records hold the same token and role.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.to_persisted() == other.to_persisted()
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field(TOKEN_KEY, &self.token.as_ref().map(|_| "[REDACTED]"))
            .field(ROLE_KEY, &self.user_role)
            .finish()
    }
}

/// On-disk shape, keyed exactly like the browser storage entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PersistedRecord {
    #[serde(rename = "token", default, skip_serializing_if = "Option::is_none")]
    pub(crate) token: Option<String>,
    #[serde(rename = "userRole", default, skip_serializing_if = "Option::is_none")]
    pub(crate) user_role: Option<String>,
}

/// Key-value storage for the credential record.
///
/// Writes are last-write-wins; there is no locking across stores sharing the
/// same backing file.
pub trait CredentialStore: Send + Sync {
    /// Reads the current record.
    fn load(&self) -> CredentialRecord;

    /// Replaces the record wholesale.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, record: CredentialRecord) -> Result<(), StoreError>;

    /// Removes both keys.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self) -> Result<(), StoreError>;

    /// Subscribes to record changes.
    fn watch(&self) -> watch::Receiver<CredentialRecord>;
}

/// Publishes `record` when it differs from the current value.
pub(crate) fn publish(tx: &watch::Sender<CredentialRecord>, record: CredentialRecord) -> bool {
    tx.send_if_modified(|current| {
        if current.same_as(&record) {
            false
        } else {
            *current = record;
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_admin_only_for_exact_match() {
        assert_eq!(Role::from_stored("admin"), Role::Admin);
        assert_eq!(Role::from_stored("Admin"), Role::User);
        assert_eq!(Role::from_stored("user"), Role::User);
        assert_eq!(Role::from_stored(""), Role::User);
    }

    #[test]
    fn landing_path_depends_on_role() {
        assert_eq!(Role::Admin.landing_path(), "/admin/dashboard");
        assert_eq!(Role::User.landing_path(), "/dashboard");
    }

    #[test]
    fn empty_token_is_not_a_token() {
        let record = CredentialRecord::new("", "user");
        assert!(!record.has_token());
        assert!(!record.is_empty());
        assert!(CredentialRecord::default().is_empty());
    }

    #[test]
    fn debug_redacts_token() {
        let record = CredentialRecord::new("jwt-secret", "admin");
        let rendered = format!("{record:?}");
        assert!(!rendered.contains("jwt-secret"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("admin"));
    }

    #[test]
    fn persisted_form_uses_storage_keys() -> Result<(), serde_json::Error> {
        let record = CredentialRecord::new("abc", "admin");
        let json = serde_json::to_value(record.to_persisted())?;
        assert_eq!(json, serde_json::json!({ "token": "abc", "userRole": "admin" }));

        let empty = serde_json::to_string(&CredentialRecord::default().to_persisted())?;
        assert_eq!(empty, "{}");
        Ok(())
    }

    #[test]
    fn publish_skips_identical_records() {
        let (tx, rx) = watch::channel(CredentialRecord::default());
        assert!(!publish(&tx, CredentialRecord::default()));
        assert!(publish(&tx, CredentialRecord::new("t", "user")));
        assert!(!publish(&tx, CredentialRecord::new("t", "user")));
        assert!(rx.borrow().has_token());
    }
}
