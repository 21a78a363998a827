//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Authentication configuration.
    pub auth: AuthConfig,
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
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
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

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens.
    pub jwt_secret: String,
    /// Bearer token lifetime in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_token_ttl_days() -> i64 {
    7
}

impl Config {
    /// Load configuration, later sources overriding earlier ones:
    /// 1. `config/default.toml`
    /// 2. `config/{FORUM_ENV}.toml` (`development` when unset)
    /// 3. `FORUM_`-prefixed environment variables, `__` between keys
    ///
    /// A `.env` file in the working directory is read first, if present.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("FORUM_ENV").unwrap_or_else(|_| "development".to_string());

        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }
}

/// `FORUM_SERVER__PORT=8080` sets `server.port`. CORS origins are a
/// comma-separated list.
fn environment() -> config::Environment {
    config::Environment::with_prefix("FORUM")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_allowed_origins")
        .try_parsing(true)
}
