use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::grant::{Grant, GrantDetail};
use crate::repositories::credential as credential_repo;
use crate::repositories::grant as grant_repo;
use crate::repositories::user as user_repo;
use crate::state::AppState;

/// Computes a grant's absolute expiry from its requested duration.
///
/// Evaluated exactly once at creation; negative durations are allowed and
/// produce a grant that is already expired.
fn expiry_from(now: DateTime<Utc>, expires_in_hours: i32) -> DateTime<Utc> {
    now + Duration::hours(i64::from(expires_in_hours))
}

/// Shares a credential with a recipient for a limited time.
///
/// The credential must exist and belong to the caller; the recipient must
/// exist. Both failures are NotFound. Existing grants to the same
/// recipient are left alone, so duplicates may coexist.
pub async fn share(
    state: &AppState,
    owner_id: Uuid,
    credential_id: Uuid,
    shared_with_id: Uuid,
    expires_in_hours: i32,
) -> Result<Grant> {
    let credential = credential_repo::find_owned(&state.db, &credential_id, &owner_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let recipient = user_repo::find_by_id(&state.db, &shared_with_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // One instant feeds both timestamps, keeping
    // expires_at - created_at exactly the requested duration.
    let now = Utc::now();
    let expires_at = expiry_from(now, expires_in_hours);

    let grant = grant_repo::create_grant(
        &state.db,
        Uuid::new_v4(),
        credential_id,
        shared_with_id,
        expires_in_hours,
        now,
        expires_at,
    )
    .await?;

    tracing::info!(
        "Credential '{}' shared with {} until {}",
        credential.title,
        recipient.email,
        grant.expires_at
    );
    Ok(grant)
}

/// Keeps only the most recently created grant per credential.
///
/// Expects the input ordered by creation time descending, which the
/// repository guarantees; later grants to the same recipient shadow
/// earlier ones for the same credential.
fn dedup_latest_per_credential(grants: Vec<GrantDetail>) -> Vec<GrantDetail> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    grants
        .into_iter()
        .filter(|g| seen.insert(g.credential_id))
        .collect()
}

/// Lists the grants a principal has received that are active and not yet
/// expired, deduplicated per credential (latest wins).
pub async fn list_received(state: &AppState, principal_id: Uuid) -> Result<Vec<GrantDetail>> {
    let grants = grant_repo::list_received(&state.db, &principal_id).await?;
    Ok(dedup_latest_per_credential(grants))
}

/// Lists every grant on the caller's credentials, expired and revoked
/// included, paginated.
pub async fn list_shared_by_me(
    state: &AppState,
    owner_id: Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<GrantDetail>> {
    grant_repo::list_by_owner(&state.db, &owner_id, skip, limit).await
}

/// Revokes a grant on one of the caller's credentials. Permanent; the
/// recipient loses decrypt access on their next request.
pub async fn revoke(state: &AppState, owner_id: Uuid, grant_id: Uuid) -> Result<()> {
    let revoked = grant_repo::revoke(&state.db, &grant_id, &owner_id).await?;
    if !revoked {
        return Err(AppError::NotFound);
    }
    tracing::info!("Grant {} revoked by {}", grant_id, owner_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grant::GrantStatus;

    #[test]
    fn expiry_is_exactly_duration_hours_after_creation() {
        let now = Utc::now();
        assert_eq!(expiry_from(now, 24) - now, Duration::hours(24));
        assert_eq!(expiry_from(now, 1) - now, Duration::hours(1));
    }

    #[test]
    fn negative_duration_is_already_expired() {
        let now = Utc::now();
        assert!(expiry_from(now, -1) < now);
    }

    fn detail(credential_id: Uuid, created_at: DateTime<Utc>) -> GrantDetail {
        GrantDetail {
            id: Uuid::new_v4(),
            credential_id,
            shared_with_id: Uuid::new_v4(),
            status: GrantStatus::Active,
            expires_in_hours: 24,
            expires_at: created_at + Duration::hours(24),
            created_at,
            credential_title: "Wifi".to_string(),
            credential_username: "admin".to_string(),
            owner_name: "Owner".to_string(),
            shared_with_email: "recipient@example.com".to_string(),
        }
    }

    #[test]
    fn dedup_keeps_only_latest_grant_per_credential() {
        let now = Utc::now();
        let cred_a = Uuid::new_v4();
        let cred_b = Uuid::new_v4();

        // Ordered by created_at descending, as the repository returns them.
        let newest = detail(cred_a, now);
        let middle = detail(cred_b, now - Duration::hours(1));
        let oldest = detail(cred_a, now - Duration::hours(2));
        let newest_id = newest.id;
        let middle_id = middle.id;

        let result = dedup_latest_per_credential(vec![newest, middle, oldest]);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, newest_id);
        assert_eq!(result[1].id, middle_id);
    }

    #[test]
    fn dedup_preserves_distinct_credentials() {
        let now = Utc::now();
        let grants = vec![detail(Uuid::new_v4(), now), detail(Uuid::new_v4(), now)];
        assert_eq!(dedup_latest_per_credential(grants).len(), 2);
    }
}
