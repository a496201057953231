use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::Result,
    models::credential::Credential,
};

/// Creates a new credential record.
pub async fn create_credential(
    pool: &Pool,
    id: Uuid,
    owner_id: Uuid,
    title: String,
    username: String,
    encrypted_secret: String,
    description: Option<String>,
) -> Result<Credential> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO credentials (id, owner_id, title, username, encrypted_secret, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
            &[&id, &owner_id, &title, &username, &encrypted_secret, &description],
        )
        .await?;
    Ok(Credential::from(&row))
}

/// Lists the credentials owned by a user, paginated.
pub async fn list_by_owner(
    pool: &Pool,
    owner_id: &Uuid,
    skip: i64,
    limit: i64,
) -> Result<Vec<Credential>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM credentials
            WHERE owner_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
            &[owner_id, &skip, &limit],
        )
        .await?;
    Ok(rows.iter().map(Credential::from).collect())
}

/// Finds a credential by id, scoped to its owner.
///
/// Existence and ownership are checked in one query so a missing record
/// and someone else's record are indistinguishable to the caller.
pub async fn find_owned(
    pool: &Pool,
    credential_id: &Uuid,
    owner_id: &Uuid,
) -> Result<Option<Credential>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM credentials
            WHERE id = $1 AND owner_id = $2
            "#,
            &[credential_id, owner_id],
        )
        .await?;
    Ok(row.as_ref().map(Credential::from))
}

/// Finds a credential by id regardless of owner. Used after the grant
/// check has already authorized the caller.
pub async fn find_by_id(pool: &Pool, credential_id: &Uuid) -> Result<Option<Credential>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM credentials
            WHERE id = $1
            "#,
            &[credential_id],
        )
        .await?;
    Ok(row.as_ref().map(Credential::from))
}

/// Partially updates an owned credential. `None` fields keep their value;
/// the secret arrives here already encrypted.
pub async fn update_owned(
    pool: &Pool,
    credential_id: &Uuid,
    owner_id: &Uuid,
    title: Option<String>,
    username: Option<String>,
    encrypted_secret: Option<String>,
    description: Option<String>,
) -> Result<Option<Credential>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE credentials
            SET
                title = COALESCE($1, title),
                username = COALESCE($2, username),
                encrypted_secret = COALESCE($3, encrypted_secret),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $5 AND owner_id = $6
            RETURNING *
            "#,
            &[&title, &username, &encrypted_secret, &description, credential_id, owner_id],
        )
        .await?;
    Ok(row.as_ref().map(Credential::from))
}

/// Hard-deletes an owned credential, cascading to its grants.
///
/// The grant delete and the credential delete commit atomically; a grant
/// must never outlive its credential. Returns whether a row was deleted.
pub async fn delete_owned(
    pool: &Pool,
    credential_id: &Uuid,
    owner_id: &Uuid,
) -> Result<bool> {
    let mut client = pool.get().await?;
    let transaction = client.transaction().await?;

    transaction
        .execute(
            r#"
            DELETE FROM access_grants
            USING credentials c
            WHERE access_grants.credential_id = c.id
              AND c.id = $1 AND c.owner_id = $2
            "#,
            &[credential_id, owner_id],
        )
        .await?;

    let deleted = transaction
        .execute(
            r#"
            DELETE FROM credentials
            WHERE id = $1 AND owner_id = $2
            "#,
            &[credential_id, owner_id],
        )
        .await?;

    transaction.commit().await?;
    Ok(deleted > 0)
}
