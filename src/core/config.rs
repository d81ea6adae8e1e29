use std::{env, fs, path::PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

const DEV_CORS_ORIGINS: &[&str] =
    &["http://localhost:5173", "http://localhost:3000", "http://localhost:8080"];

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: String },
    #[error("BACKEND_CORS_ORIGINS could not be parsed: {0}")]
    Cors(String),
    #[error("{0} must be set when strict configuration is enabled")]
    MissingSecret(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    fn from_env() -> Self {
        let raw = env_trimmed("COURSEHUB_ENV").or_else(|| env_trimmed("ENVIRONMENT"));
        Self::parse(raw.as_deref())
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") => Environment::Staging,
            Some("test") | Some("testing") => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RuntimeSettings {
    pub(crate) environment: Environment,
    pub(crate) strict_config: bool,
}

#[derive(Debug, Clone)]
struct ServerSettings {
    host: String,
    port: u16,
}

impl ServerSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let host = env_or("COURSEHUB_HOST", "0.0.0.0");
        if host.trim().is_empty() {
            return Err(ConfigError::Invalid { field: "COURSEHUB_HOST", value: host });
        }

        let raw_port = env_or("COURSEHUB_PORT", "8000");
        let port: u16 = raw_port
            .parse()
            .ok()
            .filter(|port| *port != 0)
            .ok_or(ConfigError::Invalid { field: "COURSEHUB_PORT", value: raw_port })?;

        Ok(Self { host, port })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ApiSettings {
    pub(crate) project_name: String,
    pub(crate) version: String,
}

#[derive(Debug, Clone)]
pub(crate) struct SecuritySettings {
    pub(crate) secret_key: String,
    pub(crate) access_token_expire_minutes: u64,
    pub(crate) algorithm: String,
}

impl SecuritySettings {
    fn from_env() -> Result<Self, ConfigError> {
        let secret_key = env_trimmed("SECRET_KEY").unwrap_or_else(load_or_create_secret_key);

        let raw_expiry = env_or("ACCESS_TOKEN_EXPIRE_MINUTES", "10080");
        let access_token_expire_minutes = raw_expiry.parse().map_err(|_| ConfigError::Invalid {
            field: "ACCESS_TOKEN_EXPIRE_MINUTES",
            value: raw_expiry,
        })?;

        Ok(Self { secret_key, access_token_expire_minutes, algorithm: env_or("ALGORITHM", "HS256") })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CorsSettings {
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct DatabaseSettings {
    pub(crate) postgres_server: String,
    pub(crate) postgres_port: u16,
    pub(crate) postgres_user: String,
    pub(crate) postgres_password: String,
    pub(crate) postgres_db: String,
    pub(crate) database_url: Option<String>,
}

impl DatabaseSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let raw_port = env_or("POSTGRES_PORT", "5432");
        let postgres_port = raw_port
            .parse()
            .map_err(|_| ConfigError::Invalid { field: "POSTGRES_PORT", value: raw_port })?;

        Ok(Self {
            postgres_server: env_or("POSTGRES_SERVER", "localhost"),
            postgres_port,
            postgres_user: env_or("POSTGRES_USER", "coursehub"),
            postgres_password: env_or("POSTGRES_PASSWORD", ""),
            postgres_db: env_or("POSTGRES_DB", "coursehub_db"),
            database_url: env_trimmed("DATABASE_URL"),
        })
    }

    /// DATABASE_URL wins; otherwise the URL is assembled from the POSTGRES_*
    /// parts.
    pub(crate) fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_server,
            self.postgres_port,
            self.postgres_db
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AdminSettings {
    pub(crate) first_moderator_email: String,
    pub(crate) first_moderator_password: String,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetrySettings {
    pub(crate) log_level: String,
    pub(crate) json: bool,
    pub(crate) prometheus_enabled: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    server: ServerSettings,
    runtime: RuntimeSettings,
    api: ApiSettings,
    security: SecuritySettings,
    cors: CorsSettings,
    database: DatabaseSettings,
    admin: AdminSettings,
    telemetry: TelemetrySettings,
}

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let strict_config = env_trimmed("COURSEHUB_STRICT_CONFIG")
            .map(|value| is_truthy(&value))
            .unwrap_or(false)
            || environment.is_production();

        let settings = Self {
            server: ServerSettings::from_env()?,
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings {
                project_name: env_or("PROJECT_NAME", "Coursehub API"),
                version: env_or("VERSION", env!("CARGO_PKG_VERSION")),
            },
            security: SecuritySettings::from_env()?,
            cors: CorsSettings { origins: cors_origins(env_trimmed("BACKEND_CORS_ORIGINS"))? },
            database: DatabaseSettings::from_env()?,
            admin: AdminSettings {
                first_moderator_email: env_or("FIRST_MODERATOR_EMAIL", "moderator@localhost"),
                first_moderator_password: env_or("FIRST_MODERATOR_PASSWORD", ""),
            },
            telemetry: TelemetrySettings {
                log_level: env_or("COURSEHUB_LOG_LEVEL", "info"),
                json: env_trimmed("COURSEHUB_LOG_JSON")
                    .map(|value| is_truthy(&value))
                    .unwrap_or(false),
                prometheus_enabled: env_trimmed("PROMETHEUS_ENABLED")
                    .map(|value| is_truthy(&value))
                    .unwrap_or(false),
            },
        };

        settings.validate()?;
        Ok(settings)
    }

    // Secrets may stay empty in development; strict mode refuses to boot
    // without them.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.runtime.strict_config {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.admin.first_moderator_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_MODERATOR_PASSWORD"));
        }

        Ok(())
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }
}

fn env_trimmed(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_trimmed(key).unwrap_or_else(|| default.to_string())
}

fn is_truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES" | "on" | "ON")
}

/// Accepts either a JSON array or a comma-separated list; an absent or empty
/// value falls back to the localhost development origins.
fn cors_origins(raw: Option<String>) -> Result<Vec<String>, ConfigError> {
    let defaults = || DEV_CORS_ORIGINS.iter().map(|origin| origin.to_string()).collect();

    let raw = match raw {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Ok(defaults()),
    };

    let origins: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).map_err(|_| ConfigError::Cors(raw.clone()))?
    } else {
        raw.split(',').map(|item| item.trim().to_string()).filter(|item| !item.is_empty()).collect()
    };

    if origins.is_empty() {
        Ok(defaults())
    } else {
        Ok(origins)
    }
}

fn load_or_create_secret_key() -> String {
    let path = secret_file_path();

    if let Some(existing) = read_secret_file(&path) {
        return existing;
    }

    let new_key = generate_secret_key();

    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            tracing::warn!(error = %err, path = %parent.display(), "Failed to create secret key directory");
        }
    }

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(mut file) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(err) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                    tracing::warn!(error = %err, path = %path.display(), "Failed to set secret key file permissions");
                }
            }
            if let Err(err) = std::io::Write::write_all(&mut file, new_key.as_bytes()) {
                tracing::warn!(error = %err, path = %path.display(), "Failed to write secret key file");
            }
            new_key
        }
        // Lost the race to another process; its key wins.
        Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
            read_secret_file(&path).unwrap_or(new_key)
        }
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to create secret key file");
            new_key
        }
    }
}

fn read_secret_file(path: &PathBuf) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn generate_secret_key() -> String {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn secret_file_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".secret_key")
}
