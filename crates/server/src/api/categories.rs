use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    Json,
};
use common::{CategoryDraft, CategoryPatch};

use crate::state::AppState;
use crate::utils::{created_response, json_body, message_response, ok_response, ApiResult};

pub async fn list_categories(State(state): State<AppState>) -> ApiResult {
    let categories = state
        .catalog
        .list_categories()
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    AxumPath(category_id): AxumPath<String>,
) -> ApiResult {
    let category = state
        .catalog
        .get_category(&category_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryDraft>, JsonRejection>,
) -> ApiResult {
    let draft = json_body(payload)?;
    let category = state
        .catalog
        .create_category(draft)
        .map_err(|err| state.catalog_error(err))?;
    Ok(created_response(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    AxumPath(category_id): AxumPath<String>,
    payload: Result<Json<CategoryPatch>, JsonRejection>,
) -> ApiResult {
    let patch = json_body(payload)?;
    let category = state
        .catalog
        .update_category(&category_id, patch)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    AxumPath(category_id): AxumPath<String>,
) -> ApiResult {
    state
        .catalog
        .delete_category(&category_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response::<()>("Category deleted", None))
}
