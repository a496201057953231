use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// A user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[postgres(name = "admin")]
    Admin,
    #[postgres(name = "user")]
    User,
}

/// Represents a user in the system.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's email address (unique).
    pub email: String,
    /// The user's full name.
    pub full_name: String,
    /// The user's hashed password. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// The user's role.
    pub role: UserRole,
    /// Whether the user is active.
    pub is_active: bool,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl From<&Row> for User {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            email: row.get("email"),
            full_name: row.get("full_name"),
            password_hash: row.get("password_hash"),
            role: row.get("role"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// The authenticated identity attached to every request by the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}
