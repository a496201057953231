use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::Result,
    models::user::Principal,
    services::credentials as credential_service,
    state::AppState,
};

/// The request payload for creating a credential.
#[derive(Deserialize, Validate)]
pub struct CreateCredentialRequest {
    #[garde(length(min = 1, max = 255))]
    pub title: String,
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1))]
    pub secret: String,
    #[garde(skip)]
    pub description: Option<String>,
}

/// The request payload for a partial credential update.
#[derive(Deserialize, Validate)]
pub struct UpdateCredentialRequest {
    #[garde(inner(length(max = 255)))]
    pub title: Option<String>,
    #[garde(inner(length(max = 255)))]
    pub username: Option<String>,
    #[garde(skip)]
    pub secret: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
}

/// The query parameters for the paginated credential listing.
#[derive(Deserialize)]
pub struct ListCredentialsQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// Creates a new credential owned by the caller.
#[axum::debug_handler]
pub async fn create_credential(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateCredentialRequest>,
) -> Result<Response> {
    payload.validate()?;

    let credential = credential_service::create_credential(
        &state,
        principal.id,
        payload.title,
        payload.username,
        payload.secret,
        payload.description,
    )
    .await?;

    Ok((StatusCode::OK, Json(credential)).into_response())
}

/// Lists the caller's credentials.
#[axum::debug_handler]
pub async fn list_credentials(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListCredentialsQuery>,
) -> Result<Response> {
    let credentials =
        credential_service::list_credentials(&state, principal.id, query.skip, query.limit).await?;
    Ok(Json(credentials).into_response())
}

/// Gets one of the caller's credentials by id.
#[axum::debug_handler]
pub async fn get_credential(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(credential_id): Path<Uuid>,
) -> Result<Response> {
    let credential =
        credential_service::get_credential(&state, principal.id, credential_id).await?;
    Ok(Json(credential).into_response())
}

/// Decrypts a credential's secret for the caller, if the caller is the
/// owner or holds an active grant.
#[axum::debug_handler]
pub async fn decrypt_credential(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(credential_id): Path<Uuid>,
) -> Result<Response> {
    let secret = credential_service::reveal_secret(&state, principal.id, credential_id).await?;

    let body = sonic_rs::to_string(&sonic_rs::json!({
        "secret": secret
    }))
    .map_err(|e| crate::error::AppError::Internal(format!("Response serialization failed: {}", e)))?;

    Ok((StatusCode::OK, body).into_response())
}

/// Partially updates one of the caller's credentials.
#[axum::debug_handler]
pub async fn update_credential(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(credential_id): Path<Uuid>,
    Json(payload): Json<UpdateCredentialRequest>,
) -> Result<Response> {
    payload.validate()?;

    let credential = credential_service::update_credential(
        &state,
        principal.id,
        credential_id,
        payload.title,
        payload.username,
        payload.secret,
        payload.description,
    )
    .await?;

    Ok(Json(credential).into_response())
}

/// Deletes one of the caller's credentials together with its grants.
#[axum::debug_handler]
pub async fn delete_credential(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(credential_id): Path<Uuid>,
) -> Result<Response> {
    credential_service::delete_credential(&state, principal.id, credential_id).await?;
    Ok((StatusCode::OK, r#"{"status":"success"}"#).into_response())
}
