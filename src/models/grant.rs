use chrono::{DateTime, Utc};
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// The stored status of an access grant.
///
/// Expiry is lazy: a grant past its `expires_at` keeps the `Active` status
/// on disk and is filtered out at read time instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSql, FromSql)]
#[postgres(name = "grant_status")]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    #[postgres(name = "active")]
    Active,
    #[postgres(name = "expired")]
    Expired,
    #[postgres(name = "revoked")]
    Revoked,
}

/// A time-bounded permission allowing one recipient read-decrypt access to
/// one credential.
#[derive(Debug, Clone, Serialize)]
pub struct Grant {
    /// The unique identifier for the grant.
    pub id: Uuid,
    /// The credential this grant refers to.
    pub credential_id: Uuid,
    /// The recipient user.
    pub shared_with_id: Uuid,
    /// The stored status.
    pub status: GrantStatus,
    /// The requested duration in hours.
    pub expires_in_hours: i32,
    /// The absolute expiry, computed once at creation.
    pub expires_at: DateTime<Utc>,
    /// The timestamp when the grant was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the grant was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Row> for Grant {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            credential_id: row.get("credential_id"),
            shared_with_id: row.get("shared_with_id"),
            status: row.get("status"),
            expires_in_hours: row.get("expires_in_hours"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// A grant joined with the credential and user context the listings need,
/// so a client can render who shared what without extra lookups.
#[derive(Debug, Clone, Serialize)]
pub struct GrantDetail {
    pub id: Uuid,
    pub credential_id: Uuid,
    pub shared_with_id: Uuid,
    pub status: GrantStatus,
    pub expires_in_hours: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// The title of the shared credential.
    pub credential_title: String,
    /// The username stored with the shared credential.
    pub credential_username: String,
    /// The full name of the credential's owner.
    pub owner_name: String,
    /// The email of the recipient.
    pub shared_with_email: String,
}

impl From<&Row> for GrantDetail {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            credential_id: row.get("credential_id"),
            shared_with_id: row.get("shared_with_id"),
            status: row.get("status"),
            expires_in_hours: row.get("expires_in_hours"),
            expires_at: row.get("expires_at"),
            created_at: row.get("created_at"),
            credential_title: row.get("credential_title"),
            credential_username: row.get("credential_username"),
            owner_name: row.get("owner_name"),
            shared_with_email: row.get("shared_with_email"),
        }
    }
}
