use axum::{
    Router,
    routing::{get, post, put, delete},
    middleware::from_fn_with_state,
};

use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::CorsLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod state;
mod db;
mod crypto {
    pub mod cipher;
    pub mod jwt;
}

mod models {
    pub mod user;
    pub mod credential;
    pub mod grant;
}

mod repositories {
    pub mod user;
    pub mod credential;
    pub mod grant;
}

mod services {
    pub mod auth;
    pub mod credentials;
    pub mod sharing;
}

mod handlers {
    pub mod auth;
    pub mod users;
    pub mod credentials;
    pub mod sharing;
}

mod middleware_layer {
    pub mod auth;
}

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("AppState initialized");

    db::init_schema(&state.db).await?;
    tracing::info!("Schema bootstrap completed");

    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().unwrap(),
            "http://localhost:5173".parse().unwrap(),
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ])
        .max_age(Duration::from_secs(86400));

    // Brute-force protection on the credential-bearing endpoints.
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(10)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .layer(tower_governor::GovernorLayer::new(auth_governor_conf))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/users/me", get(handlers::users::me))
        .route("/api/users/me", put(handlers::users::update_me))
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/users/by-email/{email}", get(handlers::users::user_by_email))
        .route("/api/users/{user_id}", get(handlers::users::user_by_id))
        .route("/api/passwords", post(handlers::credentials::create_credential))
        .route("/api/passwords", get(handlers::credentials::list_credentials))
        .route("/api/passwords/{credential_id}", get(handlers::credentials::get_credential))
        .route(
            "/api/passwords/{credential_id}/decrypt",
            get(handlers::credentials::decrypt_credential),
        )
        .route("/api/passwords/{credential_id}", put(handlers::credentials::update_credential))
        .route(
            "/api/passwords/{credential_id}",
            delete(handlers::credentials::delete_credential),
        )
        .route("/api/shared-credentials", post(handlers::sharing::share_credential))
        .route("/api/shared-credentials/received", get(handlers::sharing::list_received))
        .route("/api/shared-credentials/shared", get(handlers::sharing::list_shared_by_me))
        .route(
            "/api/shared-credentials/{grant_id}/revoke",
            post(handlers::sharing::revoke_grant),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    let app = Router::new()
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
