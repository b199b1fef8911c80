//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session store configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Accounting configuration.
    pub accounting: AccountingConfig,
    /// Contractor directory configuration.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Session store configuration.
///
/// Sessions live in the database with an explicit TTL; no process-local
/// session state exists anywhere.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_session_ttl(),
        }
    }
}

fn default_session_ttl() -> u64 {
    28_800 // 8 hours
}

/// Accounting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountingConfig {
    /// Account code credited by every journal posting.
    pub bank_account_code: String,
    /// Display name for the bank account.
    #[serde(default = "default_bank_account_name")]
    pub bank_account_name: String,
}

fn default_bank_account_name() -> String {
    "Municipal Treasury Account".to_string()
}

/// Which contractor directory implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryMode {
    /// Built-in static directory for development and tests.
    Mock,
    /// HTTP-backed directory client.
    Http,
}

/// Contractor directory configuration.
///
/// The implementation is selected here once at process start; nothing
/// probes for capabilities at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Which implementation to construct.
    #[serde(default = "default_directory_mode")]
    pub mode: DirectoryMode,
    /// Base URL for the HTTP implementation.
    pub base_url: Option<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            mode: default_directory_mode(),
            base_url: None,
        }
    }
}

fn default_directory_mode() -> DirectoryMode {
    DirectoryMode::Mock
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FISCA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
