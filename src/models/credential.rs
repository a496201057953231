use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;
use uuid::Uuid;

/// Represents a stored credential.
///
/// The secret value only ever exists here in encrypted form; the
/// `encrypted_secret` token is never serialized into a response. Plaintext
/// appears exclusively in the body of an authorized decrypt request.
#[derive(Debug, Clone, Serialize)]
pub struct Credential {
    /// The unique identifier for the credential.
    pub id: Uuid,
    /// The ID of the owning user. Exactly one owner, immutable.
    pub owner_id: Uuid,
    /// The credential's title.
    pub title: String,
    /// The username stored with the credential.
    pub username: String,
    /// The encrypted secret value (opaque ciphertext token).
    #[serde(skip_serializing)]
    pub encrypted_secret: String,
    /// An optional description.
    pub description: Option<String>,
    /// Whether the credential is active.
    pub is_active: bool,
    /// The timestamp when the credential was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the credential was last updated.
    pub updated_at: DateTime<Utc>,
}

impl From<&Row> for Credential {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            title: row.get("title"),
            username: row.get("username"),
            encrypted_secret: row.get("encrypted_secret"),
            description: row.get("description"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}
