use thiserror::Error;

/// Failure of one call against the remote talent API.
///
/// `Clone` because results travel inside UI messages.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Reason suitable for a banner, preferring what the server said.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Unauthorized(message)
            | ApiError::Status { message, .. }
            | ApiError::Rejected(message)
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            ApiError::Network(_) => {
                format!("{} (could not reach the server)", fallback)
            }
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_preferred() {
        let err = ApiError::Unauthorized("Invalid email or password".to_string());
        assert_eq!(err.user_message("Login failed"), "Invalid email or password");
    }

    #[test]
    fn test_fallback_when_message_empty() {
        let err = ApiError::Status { status: 500, message: String::new() };
        assert_eq!(err.user_message("Login failed"), "Login failed");

        let err = ApiError::Decode("eof".to_string());
        assert_eq!(err.user_message("Registration failed"), "Registration failed");
    }

    #[test]
    fn test_network_errors_are_not_leaked_verbatim() {
        let err = ApiError::Network("tcp connect error: Connection refused (os error 111)".to_string());
        let msg = err.user_message("Login failed");
        assert!(msg.starts_with("Login failed"));
        assert!(!msg.contains("os error"));
    }
}
