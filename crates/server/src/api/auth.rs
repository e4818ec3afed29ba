use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::AuthError;
use crate::state::{AppState, AuthContext, LoginRequest, LoginResponse, SessionResponse};
use crate::utils::{
    auth_error_response, clear_session_cookie, json_body, json_error_response, message_response,
    session_cookie_header,
};

pub async fn auth_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let payload = match json_body(payload) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return json_error_response(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        );
    }

    let issued = match state.auth.authenticate(&payload.username, &payload.password) {
        Ok(issued) => issued,
        Err(AuthError::InvalidCredentials) => {
            warn!("Failed login attempt for user {:?}", payload.username);
            return auth_error_response(state.config.production, AuthError::InvalidCredentials);
        }
        Err(err) => return auth_error_response(state.config.production, err),
    };
    info!("Admin {:?} logged in", payload.username);

    let cookie = session_cookie_header(
        &issued.token,
        state.auth.token_ttl().as_secs(),
        state.config.cookie_secure,
    );
    let mut response = Json(LoginResponse {
        error: false,
        is_admin: true,
        expires_at: issued.expires_at,
    })
    .into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    response
}

/// Tokens are stateless, so logging out only drops the cookie.
pub async fn auth_logout(State(state): State<AppState>) -> Response {
    let mut response = message_response::<()>("Logged out successfully", None);
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie(state.config.cookie_secure));
    response
}

pub async fn auth_me(Extension(context): Extension<AuthContext>) -> Json<SessionResponse> {
    let check_time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(SessionResponse {
        error: false,
        is_admin: true,
        username: context.username,
        check_time,
    })
}
