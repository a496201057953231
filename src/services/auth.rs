use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::rngs::OsRng;
use rand::RngCore;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::jwt;
use crate::error::{AppError, Result};
use crate::models::user::User;
use crate::repositories::user as user_repo;
use crate::state::AppState;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 6;

/// Hashes a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Crypto(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Crypto(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Crypto(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

/// Verifies a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Crypto(format!("Hash parse error: {}", e)))?;
    let argon2 = Argon2::default();
    let result = argon2.verify_password(&password_bytes, &parsed_hash).is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Registers a new user and issues their first bearer token.
pub async fn register(
    state: &AppState,
    email: String,
    full_name: String,
    password: String,
) -> Result<(User, String)> {
    tracing::debug!("Creating user: {}", email);

    if user_repo::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(&password)?;
    let user = user_repo::create_user(&state.db, Uuid::new_v4(), email, full_name, password_hash).await?;

    let token = jwt::issue_token(&state.config.jwt_secret, user.id, state.config.token_expire_minutes)?;

    tracing::info!("User registered with ID: {}", user.id);
    Ok((user, token))
}

/// Authenticates a user by email and password and issues a bearer token.
///
/// Unknown email and wrong password produce the same error so the
/// response does not reveal which accounts exist.
pub async fn login(state: &AppState, email: String, password: String) -> Result<(User, String)> {
    tracing::debug!("Authenticating user: {}", email);

    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid email or password".to_string()));
    }

    let token = jwt::issue_token(&state.config.jwt_secret, user.id, state.config.token_expire_minutes)?;

    tracing::info!("User authenticated: {}", user.id);
    Ok((user, token))
}

/// Partially updates the calling user's profile. A new password is hashed
/// before it is stored.
pub async fn update_profile(
    state: &AppState,
    user_id: Uuid,
    email: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
) -> Result<User> {
    let password_hash = match password {
        Some(p) => Some(hash_password(&p)?),
        None => None,
    };

    user_repo::update_profile(&state.db, &user_id, email, full_name, password_hash)
        .await?
        .ok_or(AppError::NotFound)
}
