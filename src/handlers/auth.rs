use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    services::auth as auth_service,
    state::AppState,
};

/// The request payload for user registration.
#[derive(Deserialize, Validate, Debug)]
pub struct RegisterRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1, max = 255))]
    pub full_name: String,
    #[garde(length(min = 8, max = 128))]
    pub password: String,
}

/// The request payload for user login.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub password: String,
}

/// The response payload carrying a freshly issued bearer token.
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    tracing::info!("Register attempt for: {}", payload.email);
    payload.validate()?;

    let (user, token) = auth_service::register(
        &state,
        payload.email,
        payload.full_name,
        payload.password,
    )
    .await?;

    tracing::info!("User registered: {}", user.id);

    let response = TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response> {
    tracing::info!("Login attempt for: {}", payload.email);
    payload.validate()?;

    let (user, token) = auth_service::login(&state, payload.email, payload.password).await?;

    tracing::info!("User logged in: {}", user.id);

    let response = TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
