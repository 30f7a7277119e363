//! Result and error types for fichar.

use thiserror::Error;

/// Result type for fichar operations
pub type FicharResult<T> = Result<T, FicharError>;

/// Errors that can occur while driving the portal
#[derive(Debug, Error)]
pub enum FicharError {
    /// Required environment variables are absent
    #[error("Missing required configuration: {}", keys.join(", "))]
    MissingConfiguration {
        /// Names of the absent variables
        keys: Vec<String>,
    },

    /// A configuration value is present but unusable
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Page-level CDP error
    #[error("Page error: {message}")]
    Page {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// JavaScript evaluation failed
    #[error("Evaluation failed: {message}")]
    Evaluation {
        /// Error message
        message: String,
    },

    /// Login could not be completed or verified
    #[error("Login failed: {reason}")]
    LoginFailure {
        /// What the verification saw
        reason: String,
    },

    /// A bounded wait expired where a hard failure is wanted
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Screenshot capture failed
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FicharError {
    /// Create a login failure
    #[must_use]
    pub fn login(reason: impl Into<String>) -> Self {
        Self::LoginFailure {
            reason: reason.into(),
        }
    }

    /// Create an invalid-configuration error
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an evaluation error
    #[must_use]
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}
