use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Result shape returned by `login` and `register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthOutcome {
    #[must_use]
    pub fn succeeded(role: Option<String>) -> Self {
        Self {
            success: true,
            role,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            role: None,
            error: Some(error.into()),
        }
    }
}

/// What the server said about a stored token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Valid,
    /// HTTP 401: the session is over.
    Rejected,
    /// No verdict: transport failure, timeout or an unexpected status.
    Unreachable,
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) username: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct LoginResponse {
    pub(crate) access_token: String,
    pub(crate) role: String,
}

/// New-user payload for `POST /register`.
#[derive(Debug, Serialize)]
pub struct Registration {
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub full_name: String,
    pub qualification: String,
    /// Date of birth, `YYYY-MM-DD`.
    pub dob: String,
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_omits_absent_fields() -> Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_value(AuthOutcome::succeeded(Some("admin".to_string())))?,
            json!({ "success": true, "role": "admin" })
        );
        assert_eq!(
            serde_json::to_value(AuthOutcome::failed("Invalid credentials"))?,
            json!({ "success": false, "error": "Invalid credentials" })
        );
        assert_eq!(
            serde_json::to_value(AuthOutcome::succeeded(None))?,
            json!({ "success": true })
        );
        Ok(())
    }

    #[test]
    fn registration_sends_plain_password() -> Result<(), serde_json::Error> {
        let registration = Registration {
            username: "bob@example.com".to_string(),
            password: SecretString::from("hunter2".to_string()),
            full_name: "Bob".to_string(),
            qualification: "BSc".to_string(),
            dob: "2000-01-31".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&registration)?,
            json!({
                "username": "bob@example.com",
                "password": "hunter2",
                "full_name": "Bob",
                "qualification": "BSc",
                "dob": "2000-01-31"
            })
        );
        assert!(!format!("{registration:?}").contains("hunter2"));
        Ok(())
    }
}
