use crate::error::{GuideError, Result};
use serde::Deserialize;
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "hill_guide.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub client_store: ClientStoreConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Directory of static assets served under `/assets`, if any.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub provider_id: String,
    pub provider_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: String,
    /// Base URL this service is reachable at; callbacks and post-login redirects hang off it.
    pub callback_base_url: String,
    /// Base URL of the backend that receives `POST /api/users/sync`.
    pub public_api_base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientStoreConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Prometheus listener port; no exporter when unset.
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/hill_guide.db"),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_id: "google".to_string(),
            provider_name: "Google".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo".to_string(),
            scopes: "openid email profile".to_string(),
            callback_base_url: "http://localhost:3000".to_string(),
            public_api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for ClientStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/client_store"),
        }
    }
}

impl AuthConfig {
    pub fn sync_url(&self) -> String {
        format!(
            "{}/api/users/sync",
            self.public_api_base_url.trim_end_matches('/')
        )
    }

    pub fn callback_url(&self) -> String {
        format!(
            "{}/api/auth/callback/{}",
            self.callback_base_url.trim_end_matches('/'),
            self.provider_id
        )
    }
}

impl Config {
    /// Load `HILL_GUIDE_CONFIG` (or `hill_guide.toml` when present), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let explicit = env::var("HILL_GUIDE_CONFIG").ok();
        let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else if explicit.is_some() {
            return Err(GuideError::Config(format!(
                "config file '{path}' does not exist"
            )));
        } else {
            info!("No {DEFAULT_CONFIG_PATH} found, using defaults");
            Self::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GuideError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        override_parsed("HILL_GUIDE_PORT", &mut self.server.port)?;
        override_string("OAUTH_CLIENT_ID", &mut self.auth.client_id);
        override_string("OAUTH_CLIENT_SECRET", &mut self.auth.client_secret);
        override_string("AUTH_CALLBACK_BASE_URL", &mut self.auth.callback_base_url);
        override_string("PUBLIC_API_BASE_URL", &mut self.auth.public_api_base_url);

        if let Ok(path) = env::var("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("CLIENT_STORE_DIR") {
            self.client_store.dir = PathBuf::from(dir);
        }
        if env::var("METRICS_PORT").is_ok() {
            let mut port = 0u16;
            override_parsed("METRICS_PORT", &mut port)?;
            self.metrics.port = Some(port);
        }

        if self.auth.client_id.is_empty() {
            warn!("OAUTH_CLIENT_ID is not set; sign-in will be rejected by the provider");
        }
        Ok(())
    }
}

fn override_string(key: &str, target: &mut String) {
    if let Ok(value) = env::var(key) {
        *target = value;
    }
}

fn override_parsed<T: FromStr>(key: &str, target: &mut T) -> Result<()>
where
    T::Err: Display,
{
    if let Ok(raw) = env::var(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e| GuideError::Config(format!("Invalid {key} value '{raw}': {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080

            [auth]
            public_api_base_url = "https://api.example.com/"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("data/hill_guide.db"));
        assert_eq!(config.auth.provider_id, "google");
        assert_eq!(config.auth.sync_url(), "https://api.example.com/api/users/sync");
        assert_eq!(config.metrics.port, None);
    }

    #[test]
    fn test_callback_url_uses_provider_id() {
        let auth = AuthConfig {
            callback_base_url: "https://guide.example.com".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(
            auth.callback_url(),
            "https://guide.example.com/api/auth/callback/google"
        );
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            Config::from_toml("[server]\nport = \"eighty\""),
            Err(GuideError::Toml(_))
        ));
    }
}
