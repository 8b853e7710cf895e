//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Admin workflow configuration.
    #[serde(default)]
    pub admin: AdminConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Admin panel and moderation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Row cap for the post, comment and report lists.
    #[serde(default = "default_list_limit")]
    pub list_limit: u64,
    /// Interval of the suspension expiry sweep, in seconds. Zero disables it.
    #[serde(default = "default_suspension_sweep_secs")]
    pub suspension_sweep_secs: u64,
    /// How long a pending confirmation stays valid, in seconds.
    #[serde(default = "default_confirmation_ttl_secs")]
    pub confirmation_ttl_secs: i64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
            suspension_sweep_secs: default_suspension_sweep_secs(),
            confirmation_ttl_secs: default_confirmation_ttl_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_list_limit() -> u64 {
    100
}

const fn default_suspension_sweep_secs() -> u64 {
    300
}

const fn default_confirmation_ttl_secs() -> i64 {
    600
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `GYMHUB_ENV`)
    /// 3. Environment variables with `GYMHUB__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("GYMHUB_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GYMHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("GYMHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_defaults_apply_when_section_missing() {
        let raw = r#"
            [server]
            url = "https://gymhub.example"

            [database]
            url = "postgres://localhost/gymhub"
        "#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap_or_else(|e| panic!("config should parse: {e}"));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.admin.list_limit, 100);
        assert_eq!(config.admin.suspension_sweep_secs, 300);
        assert_eq!(config.admin.confirmation_ttl_secs, 600);
    }
}
