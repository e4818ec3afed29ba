use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    Json,
};
use common::{AlbumDraft, AlbumPatch};

use crate::state::AppState;
use crate::utils::{created_response, json_body, message_response, ok_response, ApiResult};

pub async fn list_albums(State(state): State<AppState>) -> ApiResult {
    let albums = state
        .catalog
        .list_albums()
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(albums))
}

/// Album with its tracks inlined.
pub async fn get_album(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
) -> ApiResult {
    let album = state
        .catalog
        .album_detail(&album_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(album))
}

pub async fn create_album(
    State(state): State<AppState>,
    payload: Result<Json<AlbumDraft>, JsonRejection>,
) -> ApiResult {
    let draft = json_body(payload)?;
    let album = state
        .catalog
        .create_album(draft)
        .map_err(|err| state.catalog_error(err))?;
    Ok(created_response(album))
}

pub async fn update_album(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
    payload: Result<Json<AlbumPatch>, JsonRejection>,
) -> ApiResult {
    let patch = json_body(payload)?;
    let album = state
        .catalog
        .update_album(&album_id, patch)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(album))
}

pub async fn delete_album(
    State(state): State<AppState>,
    AxumPath(album_id): AxumPath<String>,
) -> ApiResult {
    state
        .catalog
        .delete_album(&album_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response::<()>(
        "Album deleted and tracks unlinked successfully",
        None,
    ))
}
