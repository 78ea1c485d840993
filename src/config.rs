use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Shared secret for the `/admin` scope. An empty token disables it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub api_token: String,
}

impl AdminConfig {
    pub fn is_enabled(&self) -> bool {
        !self.api_token.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Prefix joined with a material's stored file path to build `document_url`.
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/media".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub backend_base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8080/api/v1".to_string(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn from_toml() -> AppResult<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::from_toml_str(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env()?,
            Err(e) => {
                return Err(AppError::ConfigError(format!(
                    "cannot read config file {config_path}: {e}"
                )));
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml_str(config_str: &str) -> AppResult<Self> {
        toml::from_str(config_str)
            .map_err(|e| AppError::ConfigError(format!("failed to parse config file: {e}")))
    }

    /// Builds a config without a file; only `DATABASE_URL` is mandatory.
    fn from_env() -> AppResult<Self> {
        fn get_env(name: &str) -> Option<String> {
            env::var(name).ok()
        }
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        let database_url = get_env("DATABASE_URL").ok_or_else(|| {
            AppError::ConfigError(
                "DATABASE_URL is not set and no config.toml was found".to_string(),
            )
        })?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            admin: AdminConfig::default(),
            media: MediaConfig::default(),
            bot: BotConfig::default(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("ADMIN_API_TOKEN") {
            self.admin.api_token = v;
        }
        if let Ok(v) = env::var("MEDIA_BASE_URL") {
            self.media.base_url = v;
        }
        if let Ok(v) = env::var("BOT_BACKEND_BASE_URL") {
            self.bot.backend_base_url = v;
        }
        if let Ok(v) = env::var("BOT_REQUEST_TIMEOUT_SECS")
            && let Ok(n) = v.parse()
        {
            self.bot.request_timeout_secs = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_sections_default() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "postgres://localhost/wellness"
            max_connections = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.max_connections, 5);
        assert!(!config.admin.is_enabled());
        assert_eq!(config.bot.request_timeout_secs, 10);
        assert!(config.media.base_url.starts_with("http"));
    }

    #[test]
    fn test_explicit_sections() {
        let config = Config::from_toml_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/wellness"
            max_connections = 10

            [admin]
            api_token = "secret"

            [media]
            base_url = "https://cdn.example.com/media"

            [bot]
            backend_base_url = "http://backend:8080/api/v1"
            "#,
        )
        .unwrap();

        assert!(config.admin.is_enabled());
        assert_eq!(config.media.base_url, "https://cdn.example.com/media");
        assert_eq!(config.bot.backend_base_url, "http://backend:8080/api/v1");
        assert_eq!(config.bot.request_timeout_secs, 10);
    }

    #[test]
    fn test_missing_server_section_is_config_error() {
        let err = Config::from_toml_str("[database]\nurl = \"x\"\nmax_connections = 1\n")
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
