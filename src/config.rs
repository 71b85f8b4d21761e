// Process configuration, read once at startup

use thiserror::Error;

/// HMAC-SHA256 needs at least 256 bits of key material
pub const MIN_SECRET_LEN: usize = 32;

/// Fatal configuration errors. The service refuses to start on any of these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("JWT_SECRET must be at least 32 bytes, got {0}")]
    SecretTooShort(usize),

    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),

    #[error("ADMIN_EMAIL and ADMIN_PASSWORD must be set together")]
    PartialAdmin,
}

/// Token signing settings
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl JwtSettings {
    /// Build settings, rejecting anything a signer could not safely use
    pub fn new(secret: String, issuer: String, audience: String) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort(secret.len()));
        }
        if issuer.trim().is_empty() {
            return Err(ConfigError::Empty("JWT_ISSUER"));
        }
        if audience.trim().is_empty() {
            return Err(ConfigError::Empty("JWT_AUDIENCE"));
        }

        Ok(Self {
            secret,
            issuer,
            audience,
        })
    }
}

/// Credentials for the bootstrap administrator
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt: JwtSettings,
    /// None selects the in-memory store
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let jwt = JwtSettings::new(
            required("JWT_SECRET")?,
            required("JWT_ISSUER")?,
            required("JWT_AUDIENCE")?,
        )?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => 8080,
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(Self {
            jwt,
            database_url,
            host,
            port,
            admin,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
