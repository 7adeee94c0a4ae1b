use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    /// Manual payment channel members are instructed to use. There is no
    /// gateway integration; confirmation happens out-of-band.
    pub method: String,
    pub instructions: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            method: "multicaixa_express".to_string(),
            instructions: "Pague por referência no Multicaixa Express e aguarde a confirmação."
                .to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables (with MATRICULA__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("MATRICULA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://matricula.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
            },
            payment: PaymentConfig::default(),
        }
    }
}
