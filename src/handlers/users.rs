use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use garde::Validate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::{Principal, UserRole},
    repositories::user as user_repo,
    services::auth as auth_service,
    state::AppState,
};

/// The query parameters for paginated user listing.
#[derive(Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// The request payload for updating the calling user's profile.
#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[garde(inner(email))]
    pub email: Option<String>,
    #[garde(inner(length(min = 1, max = 255)))]
    pub full_name: Option<String>,
    #[garde(inner(length(min = 8, max = 128)))]
    pub password: Option<String>,
}

/// Returns the calling user.
#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Response> {
    let user = user_repo::find_by_id(&state.db, &principal.id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user).into_response())
}

/// Updates the calling user's profile.
#[axum::debug_handler]
pub async fn update_me(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Response> {
    payload.validate()?;

    let user = auth_service::update_profile(
        &state,
        principal.id,
        payload.email,
        payload.full_name,
        payload.password,
    )
    .await?;

    tracing::info!("Profile updated for user: {}", user.id);
    Ok(Json(user).into_response())
}

/// Lists all users. Admin only; everyone else gets 403.
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response> {
    if principal.role != UserRole::Admin {
        return Err(AppError::Forbidden);
    }

    let users = user_repo::list_users(&state.db, query.skip, query.limit).await?;
    Ok(Json(users).into_response())
}

/// Looks up a user by id. Admins may fetch anyone; everyone else only
/// themselves, and anything further is Forbidden rather than NotFound
/// since the role check happens before the lookup.
#[axum::debug_handler]
pub async fn user_by_id(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<Uuid>,
) -> Result<Response> {
    if principal.role != UserRole::Admin && principal.id != user_id {
        return Err(AppError::Forbidden);
    }

    let user = user_repo::find_by_id(&state.db, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user).into_response())
}

/// Looks up a user by email. Any authenticated user may call this, since
/// sharing a credential requires finding the recipient first.
#[axum::debug_handler]
pub async fn user_by_email(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    Path(email): Path<String>,
) -> Result<Response> {
    let user = user_repo::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user).into_response())
}
