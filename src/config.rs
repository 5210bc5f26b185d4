use std::{env, fmt, fs, path::Path};

use anyhow::Context;
use log::debug;
use serde::Deserialize;

use crate::Seconds;

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_DB_NAME: &str = "DB_NAME";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";

/// Settings for one run, built once at startup and handed to each step
#[derive(Debug, Default, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub email: EmailConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Endpoint queried with a single GET
    pub url: String,

    /// Value sent in the `User-Agent` header
    pub user_agent: String,

    /// Upper bound for the whole request
    pub timeout: Seconds,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://secure-api.example.com/get-data".to_string(),
            user_agent: "SecureClient".to_string(),
            timeout: 10.into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip)]
    pub password: Secret,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 3306,
            user: String::new(),
            password: Secret::default(),
            name: "mydatabase".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,

    /// Implicit TLS (SMTPS) port
    pub smtp_port: u16,

    /// Login used to authenticate with the SMTP server
    pub username: String,
    #[serde(skip)]
    pub password: Secret,
    pub from: String,
    pub to: String,
    pub subject: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            username: "noreply@example.com".to_string(),
            password: Secret::default(),
            from: "noreply@example.com".to_string(),
            to: "admin@example.com".to_string(),
            subject: "User Input Received".to_string(),
        }
    }
}

/// String that is never shown in `Debug` or `Display` output
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_empty() { "\"\"" } else { "\"***\"" })
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Config {
    /// Builds the config from the optional settings file then the process environment
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Config> {
        let mut result = match config_path {
            Some(path) => Self::load_from(path)?,
            None => {
                debug!("No config file given, using defaults");
                Config::default()
            }
        };
        result.apply_env(|key| env::var(key).ok());
        debug!("Config loaded: {result:?}");
        Ok(result)
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Config> {
        debug!("Loading Config from: {config_path:?}");
        let file_contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read contents of {config_path:?}"))?;
        let result = serde_json::from_str(&file_contents)
            .with_context(|| format!("Failed to parse contents of {config_path:?}"))?;
        Ok(result)
    }

    /// Overrides values with the ones found by `lookup`, keys that are not found keep their value
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_DB_HOST) {
            self.database.host = val;
        }
        if let Some(val) = lookup(ENV_DB_USER) {
            self.database.user = val;
        }
        if let Some(val) = lookup(ENV_DB_PASSWORD) {
            self.database.password = val.into();
        }
        if let Some(val) = lookup(ENV_DB_NAME) {
            self.database.name = val;
        }
        if let Some(val) = lookup(ENV_SMTP_PASSWORD) {
            self.email.password = val.into();
        }
    }
}
