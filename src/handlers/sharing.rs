use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    models::user::Principal,
    services::sharing as sharing_service,
    state::AppState,
};

/// The request payload for sharing a credential.
///
/// `expires_in_hours` is deliberately unbounded; a non-positive duration
/// creates a grant that is already expired.
#[derive(Deserialize)]
pub struct ShareCredentialRequest {
    pub credential_id: Uuid,
    pub shared_with_id: Uuid,
    pub expires_in_hours: i32,
}

/// The query parameters for the paginated "shared by me" listing.
#[derive(Deserialize)]
pub struct ListSharedQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Shares one of the caller's credentials with another user.
#[axum::debug_handler]
pub async fn share_credential(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ShareCredentialRequest>,
) -> Result<Response> {
    let grant = sharing_service::share(
        &state,
        principal.id,
        payload.credential_id,
        payload.shared_with_id,
        payload.expires_in_hours,
    )
    .await?;

    Ok((StatusCode::OK, Json(grant)).into_response())
}

/// Lists the active, unexpired grants the caller has received, one per
/// credential (latest wins).
#[axum::debug_handler]
pub async fn list_received(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Response> {
    let grants = sharing_service::list_received(&state, principal.id).await?;
    Ok(Json(grants).into_response())
}

/// Lists every grant on the caller's credentials, any status.
#[axum::debug_handler]
pub async fn list_shared_by_me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListSharedQuery>,
) -> Result<Response> {
    let grants =
        sharing_service::list_shared_by_me(&state, principal.id, query.skip, query.limit).await?;
    Ok(Json(grants).into_response())
}

/// Revokes a grant on one of the caller's credentials.
#[axum::debug_handler]
pub async fn revoke_grant(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(grant_id): Path<Uuid>,
) -> Result<Response> {
    sharing_service::revoke(&state, principal.id, grant_id).await?;
    Ok((StatusCode::OK, r#"{"status":"success"}"#).into_response())
}
