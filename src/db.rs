use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use crate::error::{AppError, Result};
use std::time::Duration;

/// Creates a new database connection pool.
///
/// # Arguments
///
/// * `database_url` - The URL of the PostgreSQL database.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(database_url: &str) -> Result<Pool> {
    let mut cfg = Config::new();
    let pg_config: tokio_postgres::Config = database_url.parse()?;

    if let Some(tokio_postgres::config::Host::Tcp(hostname)) = pg_config.get_hosts().first() {
        cfg.host = Some(hostname.to_string());
    }
    if let Some(port) = pg_config.get_ports().first() {
        cfg.port = Some(*port);
    }

    if let Some(dbname) = pg_config.get_dbname() {
        cfg.dbname = Some(dbname.to_string());
    }

    if let Some(user) = pg_config.get_user() {
        cfg.user = Some(user.to_string());
    }

    if let Some(password) = pg_config.get_password() {
        cfg.password = Some(String::from_utf8_lossy(password).to_string());
    }

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    cfg.pool = Some(PoolConfig {
        max_size: 32,
        timeouts: deadpool_postgres::Timeouts {
            wait: Some(Duration::from_secs(5)),
            create: Some(Duration::from_secs(2)),
            recycle: Some(Duration::from_secs(1)),
        },
        ..PoolConfig::default()
    });

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .map_err(AppError::from)
}

/// Bootstraps the vault schema on startup.
///
/// Every statement is idempotent, so the bootstrap can run unconditionally
/// against a fresh or an existing database.
pub async fn init_schema(pool: &Pool) -> Result<()> {
    let client = pool.get().await?;
    client
        .batch_execute(
            r#"
            DO $$ BEGIN
                CREATE TYPE user_role AS ENUM ('admin', 'user');
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END $$;

            DO $$ BEGIN
                CREATE TYPE grant_status AS ENUM ('active', 'expired', 'revoked');
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END $$;

            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                full_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role user_role NOT NULL DEFAULT 'user',
                is_active BOOLEAN NOT NULL DEFAULT true,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE TABLE IF NOT EXISTS credentials (
                id UUID PRIMARY KEY,
                owner_id UUID NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                username TEXT NOT NULL,
                encrypted_secret TEXT NOT NULL,
                description TEXT,
                is_active BOOLEAN NOT NULL DEFAULT true,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );

            CREATE INDEX IF NOT EXISTS idx_credentials_owner
                ON credentials (owner_id);

            CREATE TABLE IF NOT EXISTS access_grants (
                id UUID PRIMARY KEY,
                credential_id UUID NOT NULL REFERENCES credentials(id) ON DELETE CASCADE,
                shared_with_id UUID NOT NULL REFERENCES users(id),
                status grant_status NOT NULL DEFAULT 'active',
                expires_in_hours INTEGER NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ
            );

            CREATE INDEX IF NOT EXISTS idx_access_grants_recipient
                ON access_grants (shared_with_id);
            CREATE INDEX IF NOT EXISTS idx_access_grants_credential
                ON access_grants (credential_id);
            "#,
        )
        .await?;
    Ok(())
}
