use anyhow::{Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin of the web frontend allowed by CORS
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AuthConfig {
    /// HS256 secret bearer tokens are signed with
    pub jwt_secret: String,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 5000
cors_origin = "http://localhost:5173"

[database]
url = "sqlite:habit_tracker.db"

[auth]
jwt_secret = ""
"#;

/// Load configuration.
///
/// Search order:
/// 1. File named by `TRACKER_CONFIG`
/// 2. `config.toml` in the working directory
/// 3. Embedded default config
///
/// `PORT`, `DATABASE_URL`, `JWT_SECRET` and `CORS_ORIGIN` override the loaded values.
pub fn load_config() -> Result<Config> {
    let mut config = match config_path() {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_config(&contents)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            parse_config(DEFAULT_CONFIG)?
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TRACKER_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let local = Path::new("config.toml");
    if local.exists() {
        Some(local.to_path_buf())
    } else {
        tracing::warn!("config.toml not found in working directory");
        None
    }
}

pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).context("Invalid configuration")
}

impl Config {
    /// Apply environment overrides, looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(origin) = lookup("CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT secret is not configured (set JWT_SECRET or auth.jwt_secret)");
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("Database URL is not configured");
        }
        self.cors_origin()?;
        Ok(())
    }

    pub fn cors_origin(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&self.server.cors_origin)
            .with_context(|| format!("Invalid CORS origin '{}'", self.server.cors_origin))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.url, "sqlite:habit_tracker.db");
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_default_config_needs_a_secret() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = parse_config(DEFAULT_CONFIG).unwrap();
        config
            .apply_overrides(env(&[
                ("PORT", "8081"),
                ("DATABASE_URL", "sqlite::memory:"),
                ("JWT_SECRET", "s3cret"),
                ("CORS_ORIGIN", "https://habits.example.com"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.cors_origin().unwrap(), "https://habits.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let mut config = parse_config(DEFAULT_CONFIG).unwrap();
        assert!(config.apply_overrides(env(&[("PORT", "eighty")])).is_err());
    }

    #[test]
    fn test_file_config() {
        let config = parse_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 3000
            cors_origin = "http://localhost:8080"

            [database]
            url = "sqlite:/var/lib/habits.db"

            [auth]
            jwt_secret = "from-file"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert!(config.validate().is_ok());
        assert!(parse_config("[server]\nport = 1").is_err());
    }
}
