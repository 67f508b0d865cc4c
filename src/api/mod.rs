pub mod ai;
pub mod auth;
pub mod extract;
pub mod middleware;
pub mod notes;
pub mod state;
pub mod upload;
pub mod users;

pub use middleware::AuthUser;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use std::time::Duration;
use serde::Serialize;

use crate::error::AppError;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let uploads = Router::new()
        .route("/user/avatar", post(users::upload_avatar))
        .route("/upload-audio", post(ai::upload_audio))
        .layer(DefaultBodyLimit::max(upload::UPLOAD_BODY_LIMIT));

    let protected = Router::new()
        .route("/dashboard", get(auth::dashboard))
        .route("/user", get(users::get_profile).put(users::update_profile))
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/notes/:id/ai", post(ai::note_ai))
        .route("/ai-process", post(ai::ai_process))
        .merge(uploads)
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let api = Router::new()
        // Health check
        .route("/health", get(health))

        // Credential endpoints
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))

        .merge(protected);

    Router::new()
        .nest("/api", api)
        .layer(TimeoutLayer::new(timeout))
        .layer(axum_middleware::map_response(timeout_body))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `TimeoutLayer` answers with an empty 408; give it the usual error body
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        AppError::Timeout("Request timed out".to_string()).into_response()
    } else {
        response
    }
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
