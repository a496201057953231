use std::env;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The secret used to sign bearer tokens.
    pub jwt_secret: Zeroizing<String>,
    /// The lifetime of a bearer token in minutes.
    pub token_expire_minutes: i64,
    /// The passphrase the credential cipher key is derived from.
    pub encryption_key: Zeroizing<String>,
    /// The port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters");
        }

        let encryption_key = env::var("ENCRYPTION_KEY")
            .context("ENCRYPTION_KEY must be set (the passphrase the secret cipher is derived from)")?;

        if encryption_key.is_empty() {
            anyhow::bail!("ENCRYPTION_KEY must not be empty");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: Zeroizing::new(jwt_secret),
            token_expire_minutes: env::var("TOKEN_EXPIRE_MINUTES")
                .unwrap_or_else(|_| "11520".to_string())
                .parse()
                .context("Invalid TOKEN_EXPIRE_MINUTES")?,
            encryption_key: Zeroizing::new(encryption_key),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("Invalid PORT")?,
        })
    }
}
