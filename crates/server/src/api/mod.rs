pub mod albums;
pub mod artists;
pub mod auth;
pub mod categories;
pub mod songs;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::auth::AuthError;
use crate::state::{AppState, AuthContext, HealthResponse};
use crate::utils::{auth_error_response, extract_token, json_error_response};

/// Everything the process serves: the JSON API under `/api` and the media
/// directory under `/public`.
pub fn app_router(state: AppState) -> Router {
    let mut router = Router::new().nest("/api", api_router(state.clone()));
    if let Some(media_root) = state.catalog.media_root() {
        router = router.nest_service("/public", ServeDir::new(media_root));
    }
    router
}

pub fn api_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(auth::auth_login))
        .route("/auth/logout", post(auth::auth_logout))
        .route("/songs", get(songs::list_songs))
        .route("/songs/:id", get(songs::get_song))
        .route("/albums", get(albums::list_albums))
        .route("/albums/:id", get(albums::get_album))
        .route("/artists", get(artists::list_artists))
        .route("/artists/:id", get(artists::get_artist))
        .route("/categories", get(categories::list_categories))
        .route("/categories/:id", get(categories::get_category));

    let admin = Router::new()
        .route("/auth/me", get(auth::auth_me))
        .route("/songs", post(songs::create_song))
        .route("/songs/assign-album", post(songs::assign_album))
        .route("/songs/seed", post(songs::seed_play_counts))
        .route("/songs/sync-metadata", post(songs::sync_durations))
        .route("/songs/:id", put(songs::update_song).delete(songs::delete_song))
        .route("/songs/:id/remove-url", patch(songs::clear_url))
        .route("/albums", post(albums::create_album))
        .route("/albums/:id", put(albums::update_album).delete(albums::delete_album))
        .route("/artists", post(artists::create_artist))
        .route("/artists/:id", put(artists::update_artist).delete(artists::delete_artist))
        .route("/categories", post(categories::create_category))
        .route(
            "/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .merge(public)
        .merge(admin)
        .layer(middleware::from_fn(log_security_events))
        .with_state(state)
}

async fn require_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_token(req.headers()) {
        Some(token) => token,
        None => {
            return json_error_response(StatusCode::UNAUTHORIZED, "Unauthorized: No session found")
        }
    };

    match state.auth.verify(&token) {
        Ok(identity) if identity.is_admin() => {
            req.extensions_mut().insert(AuthContext {
                username: identity.username,
            });
            next.run(req).await
        }
        Ok(identity) => {
            warn!(
                "Access denied for {:?} with non-admin role {:?}",
                identity.username, identity.role
            );
            json_error_response(StatusCode::FORBIDDEN, "Forbidden: Admin access required")
        }
        Err(AuthError::InvalidToken) => json_error_response(
            StatusCode::UNAUTHORIZED,
            "Unauthorized: Session invalid or expired",
        ),
        Err(err) => auth_error_response(state.config.production, err),
    }
}

async fn log_security_events(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("Security event: {} {} answered {}", method, uri, status.as_u16());
    }
    response
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}
