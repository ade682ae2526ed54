use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens. A random secret is generated when
    /// not configured, which invalidates all tokens on restart.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// Admin account seeded at startup when both fields are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_minutes: default_token_ttl_minutes(),
            admin_email: None,
            admin_password: None,
        }
    }
}

fn default_jwt_secret() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_token_ttl_minutes() -> i64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    #[serde(default = "default_smtp_tls")]
    pub smtp_tls: bool,
    pub from_address: Option<String>,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Base URL the invitation links point at.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            smtp_tls: default_smtp_tls(),
            from_address: None,
            from_name: default_from_name(),
            frontend_url: default_frontend_url(),
        }
    }
}

impl EmailConfig {
    /// Check if enough is configured to actually send mail
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some() && self.from_address.is_some()
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_tls() -> bool {
    true
}

fn default_from_name() -> String {
    "Gigcal".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Forward planning horizon, approximated as months * 30 days.
    #[serde(default = "default_max_months_ahead")]
    pub max_months_ahead: i64,
    /// Color assigned to availability records created without one.
    #[serde(default = "default_color")]
    pub default_color: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            max_months_ahead: default_max_months_ahead(),
            default_color: default_color(),
        }
    }
}

fn default_max_months_ahead() -> i64 {
    18
}

fn default_color() -> String {
    "#3b82f6".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; "*" allows any origin.
    #[serde(default = "default_cors_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_cors_origins(),
        }
    }
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| "Failed to parse configuration file")?;
            Ok(config)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            calendar: CalendarConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_minutes, 30);
        assert_eq!(config.calendar.max_months_ahead, 18);
        assert_eq!(config.calendar.default_color, "#3b82f6");
        assert!(!config.email.is_configured());
    }

    #[test]
    fn test_partial_config_parses() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [calendar]
            max_months_ahead = 6
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.calendar.max_months_ahead, 6);
        // untouched sections fall back to defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.calendar.default_color, "#3b82f6");
    }

    #[test]
    fn test_email_configured() {
        let config: Config = toml::from_str(
            r#"
            [email]
            smtp_host = "smtp.example.com"
            from_address = "no-reply@example.com"
            "#,
        )
        .unwrap();
        assert!(config.email.is_configured());
        assert_eq!(config.email.smtp_port, 587);
    }
}
