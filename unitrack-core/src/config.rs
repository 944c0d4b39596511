use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Settings for the `unitrack` tooling, read from ~/.unitrack/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitrackConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite://…` for the embedded store, `postgres://…` for schema deployment
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Reported to PostgreSQL as `application_name`
    pub application_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: format!("sqlite://{}", UnitrackConfig::home_dir().join("unitrack.db").display()),
            max_connections: 5,
            acquire_timeout_secs: 30,
            application_name: "unitrack".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when RUST_LOG is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl UnitrackConfig {
    /// Load config from `config_path()`, falling back to defaults when the
    /// file doesn't exist, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file without applying environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| CoreError::config_parse(path, e))?;
        config.expand_variables();
        Ok(config)
    }

    /// ~/.unitrack, or $UNITRACK_HOME when set
    pub fn home_dir() -> PathBuf {
        if let Ok(home) = env::var("UNITRACK_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".unitrack")
    }

    /// $UNITRACK_CONFIG, else <home_dir>/config.toml
    pub fn config_path() -> PathBuf {
        env::var("UNITRACK_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::home_dir().join("config.toml"))
    }

    /// Apply environment overrides.
    ///
    /// Precedence: `UNITRACK_DATABASE_URL`, then `DATABASE_URL`, then a
    /// PostgreSQL URL assembled from `DB_HOST`/`DB_PORT`/`DB_USER`/
    /// `DB_PASSWORD`/`DB_NAME`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("UNITRACK_DATABASE_URL").or_else(|| lookup("DATABASE_URL")) {
            self.database.url = url;
        } else if let Some(host) = lookup("DB_HOST") {
            self.database.url = postgres_url(
                &host,
                lookup("DB_PORT").as_deref().unwrap_or("5432"),
                lookup("DB_USER").as_deref(),
                lookup("DB_PASSWORD").as_deref(),
                lookup("DB_NAME").as_deref().unwrap_or("postgres"),
                &self.database.application_name,
            );
        }

        if let Some(level) = lookup("UNITRACK_LOG") {
            self.logging.level = level;
        }
    }

    /// Expand ${HOME} and ${UNITRACK_HOME} in the database URL
    fn expand_variables(&mut self) {
        let mut vars = HashMap::new();
        vars.insert("HOME".to_string(), env::var("HOME").unwrap_or_default());
        vars.insert(
            "UNITRACK_HOME".to_string(),
            Self::home_dir().display().to_string(),
        );
        self.database.url = expand_string(&self.database.url, &vars);
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write config to `path`, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

fn postgres_url(
    host: &str,
    port: &str,
    user: Option<&str>,
    password: Option<&str>,
    database: &str,
    application_name: &str,
) -> String {
    let credentials = match (user, password) {
        (Some(user), Some(password)) => format!(
            "{}:{}@",
            urlencoding::encode(user),
            urlencoding::encode(password)
        ),
        (Some(user), None) => format!("{}@", urlencoding::encode(user)),
        _ => String::new(),
    };
    format!(
        "postgres://{credentials}{host}:{port}/{database}?application_name={}",
        urlencoding::encode(application_name)
    )
}

fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
    let mut result = s.to_string();
    for (key, value) in vars {
        let pattern = format!("${{{}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}
