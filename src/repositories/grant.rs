use deadpool_postgres::Pool;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::{
    error::Result,
    models::grant::{Grant, GrantDetail},
};

/// The join that decorates a grant row with credential and user context.
const GRANT_DETAIL_SELECT: &str = r#"
    SELECT
        g.id, g.credential_id, g.shared_with_id, g.status,
        g.expires_in_hours, g.expires_at, g.created_at,
        c.title AS credential_title,
        c.username AS credential_username,
        o.full_name AS owner_name,
        r.email AS shared_with_email
    FROM access_grants g
    JOIN credentials c ON g.credential_id = c.id
    JOIN users o ON c.owner_id = o.id
    JOIN users r ON g.shared_with_id = r.id
"#;

/// Creates a new grant with status `active`.
///
/// `created_at` and `expires_at` come from the same caller-side instant,
/// so `expires_at - created_at` is exactly the requested duration rather
/// than duration plus database clock skew. `expires_at` is never
/// recomputed afterwards.
pub async fn create_grant(
    pool: &Pool,
    id: Uuid,
    credential_id: Uuid,
    shared_with_id: Uuid,
    expires_in_hours: i32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<Grant> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO access_grants (id, credential_id, shared_with_id, status, expires_in_hours, created_at, expires_at)
            VALUES ($1, $2, $3, 'active', $4, $5, $6)
            RETURNING *
            "#,
            &[&id, &credential_id, &shared_with_id, &expires_in_hours, &created_at, &expires_at],
        )
        .await?;
    Ok(Grant::from(&row))
}

/// Checks whether an active, unexpired grant exists for a recipient on a
/// credential. Expiry is evaluated lazily against the clock; the stored
/// status is not updated.
pub async fn find_active_for(
    pool: &Pool,
    credential_id: &Uuid,
    shared_with_id: &Uuid,
) -> Result<Option<Grant>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM access_grants
            WHERE credential_id = $1
              AND shared_with_id = $2
              AND status = 'active'
              AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            &[credential_id, shared_with_id],
        )
        .await?;
    Ok(row.as_ref().map(Grant::from))
}

/// Lists a recipient's active, unexpired grants, most recent first.
///
/// Latest-wins dedup per credential happens in the service layer.
pub async fn list_received(pool: &Pool, shared_with_id: &Uuid) -> Result<Vec<GrantDetail>> {
    let client = pool.get().await?;
    let query = format!(
        r#"
        {GRANT_DETAIL_SELECT}
        WHERE g.shared_with_id = $1
          AND g.status = 'active'
          AND g.expires_at > NOW()
        ORDER BY g.created_at DESC
        "#
    );
    let rows = client.query(query.as_str(), &[shared_with_id]).await?;
    Ok(rows.iter().map(GrantDetail::from).collect())
}

/// Lists every grant (any status, expired and revoked included) on
/// credentials owned by a user, paginated.
pub async fn list_by_owner(
    pool: &Pool,
    owner_id: &Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<GrantDetail>> {
    let client = pool.get().await?;
    let query = format!(
        r#"
        {GRANT_DETAIL_SELECT}
        WHERE c.owner_id = $1
        ORDER BY g.created_at DESC
        OFFSET $2 LIMIT $3
        "#
    );
    let rows = client.query(query.as_str(), &[owner_id, &skip, &limit]).await?;
    Ok(rows.iter().map(GrantDetail::from).collect())
}

/// Marks a grant revoked, provided its credential is owned by the caller.
/// Returns whether a row was updated. Revocation is permanent.
pub async fn revoke(pool: &Pool, grant_id: &Uuid, owner_id: &Uuid) -> Result<bool> {
    let client = pool.get().await?;
    let updated = client
        .execute(
            r#"
            UPDATE access_grants g
            SET status = 'revoked', updated_at = NOW()
            FROM credentials c
            WHERE g.credential_id = c.id
              AND g.id = $1
              AND c.owner_id = $2
            "#,
            &[grant_id, owner_id],
        )
        .await?;
    Ok(updated > 0)
}
