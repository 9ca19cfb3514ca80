use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request cancelled")]
    Cancelled,
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// True for failures where the server never answered.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_) | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_user_facing_wording() {
        assert_eq!(
            ApiError::Network("connection refused".to_string()).to_string(),
            "Network error: connection refused"
        );
        assert_eq!(
            ApiError::Timeout("Request timed out.".to_string()).to_string(),
            "Timeout: Request timed out."
        );
    }

    #[test]
    fn transport_errors() {
        assert!(ApiError::Cancelled.is_transport());
        assert!(ApiError::Network(String::new()).is_transport());
        assert!(!ApiError::Parse(String::new()).is_transport());
    }
}
