use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// What a session does with a mail whose header/body boundary is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidMailPolicy {
    /// Log a warning and send the file untouched.
    #[default]
    Fallback,
    /// Stop sending on this connection, without QUIT.
    Abort,
}

const fn enabled() -> bool {
    true
}

/// Settings for one batch of mails, as read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub eml_files: Vec<PathBuf>,
    #[serde(default = "enabled")]
    pub update_date: bool,
    #[serde(default = "enabled")]
    pub update_message_id: bool,
    #[serde(default)]
    pub use_parallel: bool,
    #[serde(default)]
    pub invalid_mail: InvalidMailPolicy,
}

impl Settings {
    /// Load and validate a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `path` is not a file, and the
    /// other variants if it cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Parse and validate settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for syntax errors, missing keys and
    /// mistyped values, and [`ConfigError::Invalid`] for unusable values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };

        if self.smtp_host.trim().is_empty() {
            return invalid("smtpHost", "must not be empty");
        }

        if self.smtp_port == 0 {
            return invalid("smtpPort", "must not be 0");
        }

        if self.from_address.trim().is_empty() {
            return invalid("fromAddress", "must not be empty");
        }

        if self.to_addresses.is_empty() {
            return invalid("toAddresses", "must contain at least one address");
        }

        Ok(())
    }

    /// The `host:port` pair to connect to.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }

    /// Sample settings shown in the usage text.
    #[must_use]
    pub const fn sample() -> &'static str {
        r#"{
    "smtpHost": "172.16.3.151",
    "smtpPort": 25,
    "fromAddress": "a001@ah62.example.jp",
    "toAddresses": [
        "a001@ah62.example.jp",
        "a002@ah62.example.jp",
        "a003@ah62.example.jp"
    ],
    "emlFiles": [
        "test1.eml",
        "test2.eml",
        "test3.eml"
    ],
    "updateDate": true,
    "updateMessageId": true,
    "useParallel": false
}"#
    }
}
