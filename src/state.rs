use deadpool_postgres::Pool;
use std::sync::Arc;
use crate::config::Config;
use crate::crypto::cipher::SecretCipher;
use crate::error::Result;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool.
    pub db: Pool,
    /// The application's configuration.
    pub config: Config,
    /// The credential secret cipher, derived once at startup.
    pub cipher: Arc<SecretCipher>,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// The cipher key derivation is the expensive step and happens exactly
    /// once here, never per request.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        tracing::info!("PostgreSQL pool initialized with deadpool-postgres");

        let cipher = Arc::new(SecretCipher::derive(&config.encryption_key));
        tracing::info!("Secret cipher key derived");

        Ok(AppState {
            db,
            config: config.clone(),
            cipher,
        })
    }
}
