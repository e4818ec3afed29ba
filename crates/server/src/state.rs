use std::sync::Arc;

use axum::response::Response;
use catalog::{Catalog, CatalogError};
use serde::{Deserialize, Serialize};

use crate::auth::AdminAuth;
use crate::config::ServerConfig;
use crate::utils::catalog_error_response;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub auth: AdminAuth,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn catalog_error(&self, err: CatalogError) -> Response {
        catalog_error_response(self.config.production, err)
    }
}

/// `{ error, data?, message? }`, the body of every catalog response.
#[derive(Serialize)]
pub struct Envelope<T> {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub error: bool,
    pub is_admin: bool,
    pub expires_at: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub error: bool,
    pub is_admin: bool,
    pub username: String,
    pub check_time: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedCount {
    pub updated_count: usize,
}

/// Set by the admin middleware for handlers that want to know who called.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub username: String,
}
