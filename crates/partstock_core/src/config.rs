//! TOML configuration for the inventory tracker.
//!
//! # Responsibility
//! - Parse database, logging and notifier settings from one TOML document.
//! - Fill defaults and reject values the runtime cannot use.
//!
//! # Invariants
//! - A config returned by `load_config`/`from_toml_str` has a usable database
//!   and logging section. The notifier section is checked separately with
//!   `NotifierConfig::validate`, only by callers that send mail.
//! - Unknown keys are rejected so typos do not silently fall back to defaults.

use crate::logging::{default_log_level, LogLevel};
use crate::notify::{MessageSettings, SmtpSettings};
use lettre::message::Mailbox;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_DB_FILE_NAME: &str = "inventory.db";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_NOTIFIER_WORKERS: usize = 2;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config syntax: {err}"),
            Self::Invalid { field, message } => write!(f, "invalid config `{field}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct InventoryConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Absolute log directory. Logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

/// Outbound email settings. Sender and recipient have no default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotifierConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Login name; the sender address is used when unset.
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub attachment_name: String,
    pub workers: usize,
    pub timeout_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        let message = MessageSettings::default();
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            sender: String::new(),
            recipient: String::new(),
            subject: message.subject,
            attachment_name: message.attachment_name,
            workers: DEFAULT_NOTIFIER_WORKERS,
            timeout_secs: DEFAULT_SMTP_TIMEOUT_SECS,
        }
    }
}

impl NotifierConfig {
    pub fn smtp_settings(&self) -> SmtpSettings {
        SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.username.clone(),
            password: self.password.clone(),
            sender: self.sender.clone(),
            recipient: self.recipient.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn message_settings(&self) -> MessageSettings {
        MessageSettings {
            subject: self.subject.clone(),
            attachment_name: self.attachment_name.clone(),
        }
    }

    /// Checks the settings a mail delivery needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_mailbox("notifier.sender", &self.sender)?;
        validate_mailbox("notifier.recipient", &self.recipient)?;
        require_non_blank("notifier.smtp_host", &self.smtp_host)?;
        require_non_blank("notifier.subject", &self.subject)?;
        require_non_blank("notifier.attachment_name", &self.attachment_name)?;
        if self.smtp_port == 0 {
            return Err(invalid("notifier.smtp_port", "port must be non-zero"));
        }
        if self.workers == 0 {
            return Err(invalid("notifier.workers", "at least one worker is required"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("notifier.timeout_secs", "timeout must be positive"));
        }
        Ok(())
    }
}

impl InventoryConfig {
    /// Parses a TOML document and validates everything but the notifier.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(invalid("database.path", "path cannot be empty"));
        }
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(invalid(
                    "logging.dir",
                    format!("must be an absolute path, got `{}`", dir.display()),
                ));
            }
        }
        Ok(())
    }
}

/// Reads, parses and validates the config file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<InventoryConfig, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    InventoryConfig::from_toml_str(&text)
}

fn validate_mailbox(field: &'static str, value: &str) -> Result<(), ConfigError> {
    require_non_blank(field, value)?;
    value
        .parse::<Mailbox>()
        .map(|_| ())
        .map_err(|err| invalid(field, format!("`{value}` is not a mailbox: {err}")))
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "value cannot be empty"));
    }
    Ok(())
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, InventoryConfig};
    use crate::logging::LogLevel;
    use std::path::PathBuf;
    use std::time::Duration;

    const MINIMAL: &str = r#"
        [notifier]
        sender = "tracker@example.com"
        recipient = "stockroom@example.com"
    "#;

    #[test]
    fn minimal_config_fills_defaults() {
        let config = InventoryConfig::from_toml_str(MINIMAL).unwrap();
        config.notifier.validate().unwrap();

        assert_eq!(config.database.path, PathBuf::from("inventory.db"));
        assert_eq!(config.notifier.smtp_port, 465);
        assert_eq!(config.notifier.subject, "Inventory Updated");
        assert_eq!(config.notifier.attachment_name, "inventory.xlsx");
        assert_eq!(config.notifier.workers, 2);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn smtp_settings_follow_config() {
        let config = InventoryConfig::from_toml_str(
            r#"
            [logging]
            level = "warning"

            [notifier]
            smtp_host = "mail.example.com"
            smtp_port = 2465
            password = "secret"
            sender = "tracker@example.com"
            recipient = "stockroom@example.com"
            timeout_secs = 7
            "#,
        )
        .unwrap();

        let smtp = config.notifier.smtp_settings();
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(smtp.host, "mail.example.com");
        assert_eq!(smtp.port, 2465);
        assert_eq!(smtp.password.as_deref(), Some("secret"));
        assert_eq!(smtp.timeout, Duration::from_secs(7));
    }

    #[test]
    fn empty_document_is_enough_without_notifier() {
        let config = InventoryConfig::from_toml_str("").unwrap();
        assert_eq!(config.database.path, PathBuf::from("inventory.db"));
        assert!(matches!(
            config.notifier.validate(),
            Err(ConfigError::Invalid { field: "notifier.sender", .. })
        ));
    }

    #[test]
    fn missing_recipient_is_rejected() {
        let config = InventoryConfig::from_toml_str(
            r#"
            [notifier]
            sender = "tracker@example.com"
            "#,
        )
        .unwrap();
        let err = config.notifier.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "notifier.recipient", .. }
        ));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let text = format!("{MINIMAL}\nworkers = 0\n");
        let config = InventoryConfig::from_toml_str(&text).unwrap();
        let err = config.notifier.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "notifier.workers", .. }));
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let text = format!("[logging]\ndir = \"logs\"\n{MINIMAL}");
        let err = InventoryConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "logging.dir", .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\nretry = true\n");
        let err = InventoryConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
