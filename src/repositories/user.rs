use deadpool_postgres::Pool;
use uuid::Uuid;
use crate::{
    error::Result,
    models::user::User,
};

/// Creates a new user in the database.
pub async fn create_user(
    pool: &Pool,
    id: Uuid,
    email: String,
    full_name: String,
    password_hash: String,
) -> Result<User> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            r#"
            INSERT INTO users (id, email, full_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
            &[&id, &email, &full_name, &password_hash],
        )
        .await?;
    Ok(User::from(&row))
}

/// Finds a user by their email address.
pub async fn find_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM users
            WHERE email = $1
            "#,
            &[&email],
        )
        .await?;
    Ok(row.as_ref().map(User::from))
}

/// Finds a user by their ID.
pub async fn find_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM users
            WHERE id = $1
            "#,
            &[user_id],
        )
        .await?;
    Ok(row.as_ref().map(User::from))
}

/// Finds an active user by their ID. Used by the auth middleware so that
/// deactivated accounts lose access on their next request.
pub async fn find_active_by_id(pool: &Pool, user_id: &Uuid) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT *
            FROM users
            WHERE id = $1 AND is_active = true
            "#,
            &[user_id],
        )
        .await?;
    Ok(row.as_ref().map(User::from))
}

/// Lists users, paginated. Callers are responsible for the admin check.
pub async fn list_users(pool: &Pool, skip: i64, limit: i64) -> Result<Vec<User>> {
    let client = pool.get().await?;
    let rows = client
        .query(
            r#"
            SELECT *
            FROM users
            ORDER BY created_at ASC
            OFFSET $1 LIMIT $2
            "#,
            &[&skip, &limit],
        )
        .await?;
    Ok(rows.iter().map(User::from).collect())
}

/// Partially updates a user's profile. `None` fields keep their value.
pub async fn update_profile(
    pool: &Pool,
    user_id: &Uuid,
    email: Option<String>,
    full_name: Option<String>,
    password_hash: Option<String>,
) -> Result<Option<User>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            UPDATE users
            SET
                email = COALESCE($1, email),
                full_name = COALESCE($2, full_name),
                password_hash = COALESCE($3, password_hash),
                updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
            &[&email, &full_name, &password_hash, user_id],
        )
        .await?;
    Ok(row.as_ref().map(User::from))
}
