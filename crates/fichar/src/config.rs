//! Environment configuration.
//!
//! Everything the agent needs comes from the process environment (a `.env`
//! file is loaded by the CLI before this runs): the portal URL, the
//! credentials, and an optional headless toggle. All missing required keys
//! are reported together so a bad deployment fails with one complete message.

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::browser::BrowserConfig;
use crate::result::{FicharError, FicharResult};

/// Environment variables the agent requires
pub const REQUIRED_KEYS: [&str; 3] = ["TARGET_URL", "LOGIN_USERNAME", "LOGIN_PASSWORD"];

/// Which attendance action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Morning punch-in
    ClockIn,
    /// Evening punch-out
    ClockOut,
}

impl Mode {
    /// Infer the action from the local hour: mornings clock in, evenings
    /// clock out, anything else is a no-op.
    #[must_use]
    pub const fn infer(hour: u32) -> Option<Self> {
        match hour {
            6..=11 => Some(Self::ClockIn),
            17..=21 => Some(Self::ClockOut),
            _ => None,
        }
    }
}

/// Login target and credentials
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Portal login URL
    pub target_url: Url,
    /// Account username
    pub username: String,
    /// Account password
    pub password: String,
}

/// Full agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Login target and credentials
    pub credentials: Credentials,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// Where failure artifacts are written
    pub artifact_dir: PathBuf,
}

impl AgentConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> FicharResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> FicharResult<Self> {
        let mut missing = Vec::new();
        let mut require = |key: &str| match lookup(key) {
            Some(value) if !value.is_empty() => Some(value),
            _ => {
                missing.push(key.to_string());
                None
            }
        };

        let target = require("TARGET_URL");
        let username = require("LOGIN_USERNAME");
        let password = require("LOGIN_PASSWORD");

        if !missing.is_empty() {
            return Err(FicharError::MissingConfiguration { keys: missing });
        }

        let (target, username, password) = (
            target.unwrap_or_default(),
            username.unwrap_or_default(),
            password.unwrap_or_default(),
        );

        let target_url = Url::parse(&target)
            .map_err(|e| FicharError::invalid_config(format!("TARGET_URL: {e}")))?;

        let headless = lookup("HEADLESS").map_or(true, |value| value != "false");

        Ok(Self {
            credentials: Credentials {
                target_url,
                username,
                password,
            },
            browser: BrowserConfig::default().with_headless(headless),
            artifact_dir: PathBuf::from("artifacts"),
        })
    }
}
