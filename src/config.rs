//! Configuration for the intake service.

use serde::Deserialize;
use std::path::Path;

use crate::{IntakeError, Result};

/// Minimum length of the download signing secret, in bytes.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Timezone for displaying dates (e.g., "Europe/Paris", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timezone: default_timezone(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/intake.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Uploaded document storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored objects.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Maximum size of a single uploaded file in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// HMAC key for signed download links.
    #[serde(default)]
    pub signing_secret: String,
    /// Lifetime of a signed download link in seconds.
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

fn default_storage_path() -> String {
    "data/files".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_signed_url_ttl() -> u64 {
    3600 // 1 hour
}

impl StorageConfig {
    /// Request body limit for the intake route: two files plus form fields.
    pub fn body_limit_bytes(&self) -> usize {
        ((self.max_upload_size_mb * 2 + 1) * 1024 * 1024) as usize
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            signing_secret: String::new(),
            signed_url_ttl_secs: default_signed_url_ttl(),
        }
    }
}

/// Admin session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
    /// Mark the cookie `Secure` (HTTPS deployments).
    #[serde(default)]
    pub secure_cookie: bool,
    /// Interval of the expired-session prune task in seconds (0 = disabled).
    #[serde(default)]
    pub prune_interval_secs: u64,
}

fn default_cookie_name() -> String {
    "intake_admin_session".to_string()
}

fn default_session_ttl() -> u64 {
    8 * 60 * 60 // 8 hours
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_secs: default_session_ttl(),
            secure_cookie: false,
            prune_interval_secs: 0,
        }
    }
}

/// Web surface configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for the login endpoint (requests per minute per IP).
    #[serde(default = "default_login_rate_limit")]
    pub login_rate_limit: u32,
    /// Serve Swagger UI and the OpenAPI document.
    #[serde(default = "default_swagger_ui")]
    pub swagger_ui: bool,
    /// Key the login limiter on `X-Forwarded-For` / `X-Real-IP`.
    /// Only enable behind a reverse proxy that sets them.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_login_rate_limit() -> u32 {
    5 // 5 requests per minute
}

fn default_swagger_ui() -> bool {
    true
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            login_rate_limit: default_login_rate_limit(),
            swagger_ui: default_swagger_ui(),
            trust_proxy_headers: false,
        }
    }
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Language code (fr / en).
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "fr".to_string()
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file, appended to in addition to stdout.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Document storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Admin session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Web surface configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Locale configuration.
    #[serde(default)]
    pub locale: LocaleConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(IntakeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file, or `None` when the file does not
    /// exist. Unreadable or malformed files are still errors.
    pub fn load_optional<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        match Self::load(path) {
            Ok(config) => Ok(Some(config)),
            Err(IntakeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| IntakeError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `INTAKE_SIGNING_SECRET`: download link signing key
    /// - `INTAKE_DATABASE_PATH`: SQLite database file
    /// - `INTAKE_STORAGE_PATH`: document storage root
    /// - `INTAKE_PORT`: listen port
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source. Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(secret) = get("INTAKE_SIGNING_SECRET") {
            self.storage.signing_secret = secret;
        }
        if let Some(path) = get("INTAKE_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(path) = get("INTAKE_STORAGE_PATH") {
            self.storage.path = path;
        }
        if let Some(port) = get("INTAKE_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.signing_secret.len() < MIN_SIGNING_SECRET_LEN {
            return Err(IntakeError::Config(format!(
                "storage.signing_secret must be at least {MIN_SIGNING_SECRET_LEN} bytes. \
                 Set it in config.toml or via INTAKE_SIGNING_SECRET environment variable."
            )));
        }
        if self.server.port == 0 {
            return Err(IntakeError::Config("server.port must not be 0".to_string()));
        }
        if self.session.ttl_secs == 0 {
            return Err(IntakeError::Config(
                "session.ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(IntakeError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.timezone, "Europe/Paris");

        assert_eq!(config.database.path, "data/intake.db");

        assert_eq!(config.storage.path, "data/files");
        assert_eq!(config.storage.max_upload_size_mb, 10);
        assert!(config.storage.signing_secret.is_empty());
        assert_eq!(config.storage.signed_url_ttl_secs, 3600);

        assert_eq!(config.session.cookie_name, "intake_admin_session");
        assert_eq!(config.session.ttl_secs, 28800);
        assert!(!config.session.secure_cookie);
        assert_eq!(config.session.prune_interval_secs, 0);

        assert!(config.web.cors_origins.is_empty());
        assert_eq!(config.web.login_rate_limit, 5);
        assert!(config.web.swagger_ui);

        assert_eq!(config.locale.language, "fr");
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 3000
timezone = "Africa/Kinshasa"

[database]
path = "custom/db.sqlite"

[storage]
path = "custom/files"
max_upload_size_mb = 20
signing_secret = "0123456789abcdef0123456789abcdef"
signed_url_ttl_secs = 600

[session]
cookie_name = "staff"
ttl_secs = 3600
secure_cookie = true
prune_interval_secs = 900

[web]
cors_origins = ["https://jobs.example.org"]
login_rate_limit = 10
swagger_ui = false

[locale]
language = "en"

[logging]
level = "debug"
file = "logs/intake.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.timezone, "Africa/Kinshasa");
        assert_eq!(config.database.path, "custom/db.sqlite");
        assert_eq!(config.storage.path, "custom/files");
        assert_eq!(config.storage.max_upload_size_mb, 20);
        assert_eq!(config.storage.signing_secret, SECRET);
        assert_eq!(config.storage.signed_url_ttl_secs, 600);
        assert_eq!(config.session.cookie_name, "staff");
        assert_eq!(config.session.ttl_secs, 3600);
        assert!(config.session.secure_cookie);
        assert_eq!(config.session.prune_interval_secs, 900);
        assert_eq!(config.web.cors_origins, vec!["https://jobs.example.org"]);
        assert_eq!(config.web.login_rate_limit, 10);
        assert!(!config.web.swagger_ui);
        assert_eq!(config.locale.language, "en");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file.as_deref(), Some("logs/intake.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 3000
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.session.ttl_secs, 28800);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        if let Err(IntakeError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(IntakeError::Io(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[locale]\nlanguage = \"en\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.locale.language, "en");
    }

    #[test]
    fn test_load_optional() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(Config::load_optional(&missing).unwrap().is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[server]\nport = 9000\n").unwrap();
        let config = Config::load_optional(&good).unwrap().unwrap();
        assert_eq!(config.server.port, 9000);

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[server\nport = ").unwrap();
        assert!(matches!(
            Config::load_optional(&broken),
            Err(IntakeError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("INTAKE_SIGNING_SECRET", SECRET),
            ("INTAKE_DATABASE_PATH", "/var/lib/intake/db.sqlite"),
            ("INTAKE_STORAGE_PATH", "/var/lib/intake/files"),
            ("INTAKE_PORT", "9000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.signing_secret, SECRET);
        assert_eq!(config.database.path, "/var/lib/intake/db.sqlite");
        assert_eq!(config.storage.path, "/var/lib/intake/files");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_overrides_ignore_empty_and_invalid_values() {
        let mut config = Config::default();
        config.storage.signing_secret = "configured".to_string();
        config.apply_overrides_from(|name| match name {
            "INTAKE_SIGNING_SECRET" => Some(String::new()),
            "INTAKE_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });

        assert_eq!(config.storage.signing_secret, "configured");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_validate_requires_signing_secret() {
        let config = Config::default();
        match config.validate() {
            Err(IntakeError::Config(msg)) => assert!(msg.contains("signing_secret")),
            other => panic!("expected config error, got {other:?}"),
        }

        let mut config = Config::default();
        config.storage.signing_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.storage.signing_secret = SECRET.to_string();
        assert!(config.validate().is_ok());

        config.session.ttl_secs = 0;
        assert!(config.validate().is_err());

        config.session.ttl_secs = 60;
        config.storage.max_upload_size_mb = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_body_limit() {
        let config = StorageConfig::default();
        assert_eq!(config.body_limit_bytes(), 21 * 1024 * 1024);
    }
}
