use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalog::CatalogError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::auth::AuthError;
use crate::state::Envelope;

pub const SESSION_COOKIE: &str = "admin_token";

const MASKED_MESSAGE: &str = "An internal server error occurred";

pub type ApiResult = Result<Response, Response>;

pub fn json_error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(Envelope::<()> {
            error: true,
            data: None,
            message: Some(message.into()),
        }),
    )
        .into_response()
}

pub fn ok_response<T: Serialize>(data: T) -> Response {
    Json(Envelope {
        error: false,
        data: Some(data),
        message: None,
    })
    .into_response()
}

pub fn created_response<T: Serialize>(data: T) -> Response {
    let mut response = ok_response(data);
    *response.status_mut() = StatusCode::CREATED;
    response
}

pub fn message_response<T: Serialize>(message: impl Into<String>, data: Option<T>) -> Response {
    Json(Envelope {
        error: false,
        data,
        message: Some(message.into()),
    })
    .into_response()
}

/// Server faults keep their detail in the log; in production the client
/// only sees a generic message.
pub fn internal_error_response(production: bool, detail: impl std::fmt::Display) -> Response {
    error!("Internal error: {}", detail);
    let message = if production {
        MASKED_MESSAGE.to_string()
    } else {
        detail.to_string()
    };
    json_error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub fn catalog_error_response(production: bool, err: CatalogError) -> Response {
    match err {
        CatalogError::NotFound(_) => json_error_response(StatusCode::NOT_FOUND, err.to_string()),
        CatalogError::Validation(message) => json_error_response(StatusCode::BAD_REQUEST, message),
        CatalogError::Storage(_) => internal_error_response(production, err),
    }
}

pub fn auth_error_response(production: bool, err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials | AuthError::InvalidToken => {
            json_error_response(StatusCode::UNAUTHORIZED, err.to_string())
        }
        AuthError::NotConfigured => {
            error!("Admin credentials or token secret are not configured");
            json_error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        AuthError::Signing(_) => internal_error_response(production, err),
    }
}

/// Unwraps a JSON body extracted as `Result<Json<T>, JsonRejection>`, turning
/// any rejection into an envelope.
pub fn json_body<T: DeserializeOwned>(
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, Response> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(rejection)) => Err(json_error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            rejection.body_text(),
        )),
        Err(rejection) => Err(json_error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid JSON body: {}", rejection.body_text()),
        )),
    }
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(value) = value.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }
    let cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    parse_cookie_value(cookie, SESSION_COOKIE)
}

fn parse_cookie_value(cookie: &str, name: &str) -> Option<String> {
    for part in cookie.split(';') {
        let mut iter = part.trim().splitn(2, '=');
        let key = iter.next()?.trim();
        let value = match iter.next() {
            Some(value) => value.trim(),
            None => continue,
        };
        if key == name && !value.is_empty() {
            return Some(value.to_string());
        }
    }
    None
}

pub fn session_cookie_header(token: &str, max_age_secs: u64, secure: bool) -> HeaderValue {
    let value = format!(
        "{}={}; {}; Max-Age={}",
        SESSION_COOKIE,
        token,
        cookie_attributes(secure),
        max_age_secs
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| clear_session_cookie(secure))
}

pub fn clear_session_cookie(secure: bool) -> HeaderValue {
    let value = format!("{}=; {}; Max-Age=0", SESSION_COOKIE, cookie_attributes(secure));
    HeaderValue::from_str(&value)
        .unwrap_or_else(|_| HeaderValue::from_static("admin_token=; Path=/; Max-Age=0"))
}

fn cookie_attributes(secure: bool) -> &'static str {
    if secure {
        "HttpOnly; Secure; SameSite=None; Path=/"
    } else {
        "HttpOnly; SameSite=Lax; Path=/"
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
    use catalog::{CatalogError, StoreError};

    use super::{
        catalog_error_response, clear_session_cookie, extract_token, session_cookie_header,
    };

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; admin_token=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn malformed_cookies_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("flag; admin_token=; x=1"));
        assert_eq!(extract_token(&headers), None);
        headers.insert(header::COOKIE, HeaderValue::from_static("flag; admin_token=abc"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_attributes_follow_secure_flag() {
        let secure = session_cookie_header("tok", 86_400, true);
        assert_eq!(
            secure.to_str().unwrap(),
            "admin_token=tok; HttpOnly; Secure; SameSite=None; Path=/; Max-Age=86400"
        );
        let lax = session_cookie_header("tok", 60, false);
        assert_eq!(
            lax.to_str().unwrap(),
            "admin_token=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=60"
        );
        assert!(clear_session_cookie(true).to_str().unwrap().ends_with("Max-Age=0"));
    }

    #[test]
    fn catalog_errors_map_to_statuses() {
        let not_found = catalog_error_response(false, CatalogError::NotFound("Song"));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        let invalid = catalog_error_response(false, CatalogError::Validation("bad".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let storage = catalog_error_response(true, CatalogError::Storage(StoreError::Io(io)));
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
