use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use http::header;

use crate::{
    crypto::jwt,
    error::{AppError, Result},
    models::user::Principal,
    repositories::user as user_repo,
    state::AppState,
};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// A middleware that requires a valid bearer token.
///
/// The token is verified on every request and the principal is re-loaded
/// from the database, so deactivated accounts and expired tokens are cut
/// off immediately. On success a `Principal` extension is attached.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let token = extract_bearer_token(&request).ok_or_else(|| {
        tracing::debug!("Missing bearer token");
        AppError::Authentication("Not authenticated".to_string())
    })?;

    let user_id = jwt::verify_token(&state.config.jwt_secret, token)?;

    let user = user_repo::find_active_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for unknown or inactive user: {}", user_id);
            AppError::Authentication("Not authenticated".to_string())
        })?;

    tracing::debug!("User authenticated: {}", user.id);

    request.extensions_mut().insert(Principal::from(&user));

    Ok(next.run(request).await)
}
