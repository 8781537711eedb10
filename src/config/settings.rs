//! TOML-based configuration for modelsync.
//!
//! Supports a config file (`modelsync.toml`) with environment variable
//! expansion, plus overrides from the Nhost environment variables.
//!
//! Example configuration:
//! ```toml
//! [metadata]
//! subdomain = "abcdefghijklmnop"
//! region = "eu-central-1"
//! admin_secret = "${HASURA_ADMIN_SECRET}"
//! timeout_secs = 30
//!
//! [sync]
//! cache_ttl_seconds = 300
//! lock_timeout_ms = 5000
//! standard_fields = true
//!
//! [server]
//! port = 3001
//! graphql_concurrency = 1
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Metadata service connection.
    pub metadata: MetadataSettings,

    /// Reconciler behaviour.
    pub sync: SyncSettings,

    /// Boundary API server.
    pub server: ServerSettings,
}

/// Metadata service connection.
///
/// `endpoint` wins over `subdomain` + `region`. String values support
/// `${ENV_VAR}` expansion, resolved when a request is made.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// Full service root, e.g. `http://localhost:8080`.
    pub endpoint: Option<String>,

    /// Nhost project subdomain.
    pub subdomain: Option<String>,

    /// Nhost region.
    pub region: String,

    /// Admin secret sent as `x-hasura-admin-secret`.
    pub admin_secret: Option<String>,

    /// Hasura data source name.
    pub source: String,

    /// Postgres schema holding managed tables.
    pub schema: String,

    /// HTTP request timeout.
    pub timeout_secs: u64,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            subdomain: None,
            region: "us-east-1".to_string(),
            admin_secret: None,
            source: "default".to_string(),
            schema: "public".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Reconciler behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Cache live table structures between reads.
    pub cache_enabled: bool,

    /// Structure cache TTL in seconds.
    pub cache_ttl_seconds: u64,

    /// How long a reconciliation waits for a table lock before `Busy`.
    pub lock_timeout_ms: u64,

    /// Append the standard fields to ad-hoc models on create.
    pub standard_fields: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            cache_ttl_seconds: 300,
            lock_timeout_ms: 5000,
            standard_fields: true,
        }
    }
}

impl SyncSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Boundary API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// Concurrent GraphQL proxy requests.
    pub graphql_concurrency: usize,

    /// How long a proxy request waits for a free slot before 429.
    pub graphql_wait_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            graphql_concurrency: 1,
            graphql_wait_ms: 0,
        }
    }
}

/// Environment variables that override `[metadata]`, in priority order.
const ENDPOINT_VARS: &[&str] = &["HASURA_ENDPOINT", "NEXT_PUBLIC_HASURA_ENDPOINT"];
const SUBDOMAIN_VARS: &[&str] = &["NHOST_SUBDOMAIN", "NEXT_PUBLIC_NHOST_SUBDOMAIN"];
const REGION_VARS: &[&str] = &["NHOST_REGION", "NEXT_PUBLIC_NHOST_REGION"];
const SECRET_VARS: &[&str] = &["HASURA_ADMIN_SECRET", "NEXT_PUBLIC_HASURA_ADMIN_SECRET"];

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations, then apply
    /// environment overrides.
    ///
    /// Searches in order:
    /// 1. Environment variable `MODELSYNC_CONFIG`
    /// 2. `./modelsync.toml`
    /// 3. `~/.config/modelsync/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = Self::load_file()?;
        settings.apply_env_overrides(|name| env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    fn load_file() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("MODELSYNC_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("modelsync.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("modelsync").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Override `[metadata]` from environment variables.
    ///
    /// `lookup` resolves a variable name; empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|n| lookup(n))
                .find(|v| !v.trim().is_empty())
        };

        if let Some(endpoint) = first(ENDPOINT_VARS) {
            self.metadata.endpoint = Some(endpoint);
        }
        if let Some(subdomain) = first(SUBDOMAIN_VARS) {
            self.metadata.subdomain = Some(subdomain);
        }
        if let Some(region) = first(REGION_VARS) {
            self.metadata.region = region;
        }
        if let Some(secret) = first(SECRET_VARS) {
            self.metadata.admin_secret = Some(secret);
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.graphql_concurrency == 0 {
            return Err(SettingsError::InvalidConfig(
                "server.graphql_concurrency must be at least 1".into(),
            ));
        }
        if self.metadata.timeout_secs == 0 {
            return Err(SettingsError::InvalidConfig(
                "metadata.timeout_secs must be at least 1".into(),
            ));
        }
        if !crate::sql::ident::is_valid_identifier(&self.metadata.schema) {
            return Err(SettingsError::InvalidConfig(format!(
                "metadata.schema {:?} is not a valid identifier",
                self.metadata.schema
            )));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                // Lone `$` is kept.
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
