use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::credential::Credential;
use crate::repositories::credential as credential_repo;
use crate::repositories::grant as grant_repo;
use crate::state::AppState;

/// Creates a credential for its owner. The secret is encrypted before it
/// ever reaches the repository; the returned record carries only the
/// ciphertext token, which is not serialized into responses.
pub async fn create_credential(
    state: &AppState,
    owner_id: Uuid,
    title: String,
    username: String,
    secret: String,
    description: Option<String>,
) -> Result<Credential> {
    let encrypted_secret = state.cipher.encrypt(&secret)?;

    let credential = credential_repo::create_credential(
        &state.db,
        Uuid::new_v4(),
        owner_id,
        title,
        username,
        encrypted_secret,
        normalize(description),
    )
    .await?;

    tracing::info!("Credential {} created by {}", credential.id, owner_id);
    Ok(credential)
}

/// Lists the caller's credentials, paginated.
pub async fn list_credentials(
    state: &AppState,
    owner_id: Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<Credential>> {
    credential_repo::list_by_owner(&state.db, &owner_id, skip, limit).await
}

/// Fetches one of the caller's credentials. A credential that does not
/// exist and one owned by someone else are both NotFound.
pub async fn get_credential(
    state: &AppState,
    owner_id: Uuid,
    credential_id: Uuid,
) -> Result<Credential> {
    credential_repo::find_owned(&state.db, &credential_id, &owner_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Partially updates one of the caller's credentials. Empty-string fields
/// are treated as absent; a provided secret is re-encrypted.
pub async fn update_credential(
    state: &AppState,
    owner_id: Uuid,
    credential_id: Uuid,
    title: Option<String>,
    username: Option<String>,
    secret: Option<String>,
    description: Option<String>,
) -> Result<Credential> {
    let encrypted_secret = match normalize(secret) {
        Some(s) => Some(state.cipher.encrypt(&s)?),
        None => None,
    };

    credential_repo::update_owned(
        &state.db,
        &credential_id,
        &owner_id,
        normalize(title),
        normalize(username),
        encrypted_secret,
        normalize(description),
    )
    .await?
    .ok_or(AppError::NotFound)
}

/// Hard-deletes one of the caller's credentials together with its grants.
pub async fn delete_credential(
    state: &AppState,
    owner_id: Uuid,
    credential_id: Uuid,
) -> Result<()> {
    let deleted = credential_repo::delete_owned(&state.db, &credential_id, &owner_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    tracing::info!("Credential {} deleted by {}", credential_id, owner_id);
    Ok(())
}

/// Decides whether a principal may decrypt a credential and returns it.
///
/// Owner access always passes. Otherwise an active, unexpired grant for
/// this (credential, principal) pair is required. Denial is NotFound in
/// every case so unauthorized callers cannot confirm the credential
/// exists. The decision is re-evaluated on every call; a revocation or a
/// lazy expiry takes effect on the very next request.
async fn authorize_decrypt(
    state: &AppState,
    principal_id: Uuid,
    credential_id: Uuid,
) -> Result<Credential> {
    if let Some(owned) = credential_repo::find_owned(&state.db, &credential_id, &principal_id).await? {
        return Ok(owned);
    }

    let grant = grant_repo::find_active_for(&state.db, &credential_id, &principal_id).await?;
    if grant.is_none() {
        return Err(AppError::NotFound);
    }

    credential_repo::find_by_id(&state.db, &credential_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Decrypts a credential's secret for an authorized principal.
///
/// The plaintext is returned once and never cached.
pub async fn reveal_secret(
    state: &AppState,
    principal_id: Uuid,
    credential_id: Uuid,
) -> Result<String> {
    let credential = authorize_decrypt(state, principal_id, credential_id).await?;
    let secret = state.cipher.decrypt(&credential.encrypted_secret)?;

    tracing::debug!("Credential {} decrypted for {}", credential_id, principal_id);
    Ok(secret)
}

/// Maps absent and empty-string optional fields to `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_empty_fields() {
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some("".to_string())), None);
        assert_eq!(normalize(Some("   ".to_string())), None);
        assert_eq!(normalize(Some("wifi".to_string())), Some("wifi".to_string()));
    }
}
