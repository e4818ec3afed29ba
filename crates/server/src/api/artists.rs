use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    Json,
};
use common::{ArtistDraft, ArtistPatch};

use crate::state::AppState;
use crate::utils::{created_response, json_body, message_response, ok_response, ApiResult};

pub async fn list_artists(State(state): State<AppState>) -> ApiResult {
    let artists = state
        .catalog
        .list_artists()
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(artists))
}

pub async fn get_artist(
    State(state): State<AppState>,
    AxumPath(artist_id): AxumPath<String>,
) -> ApiResult {
    let artist = state
        .catalog
        .artist_detail(&artist_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(artist))
}

pub async fn create_artist(
    State(state): State<AppState>,
    payload: Result<Json<ArtistDraft>, JsonRejection>,
) -> ApiResult {
    let draft = json_body(payload)?;
    let artist = state
        .catalog
        .create_artist(draft)
        .map_err(|err| state.catalog_error(err))?;
    Ok(created_response(artist))
}

pub async fn update_artist(
    State(state): State<AppState>,
    AxumPath(artist_id): AxumPath<String>,
    payload: Result<Json<ArtistPatch>, JsonRejection>,
) -> ApiResult {
    let patch = json_body(payload)?;
    let artist = state
        .catalog
        .update_artist(&artist_id, patch)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(artist))
}

pub async fn delete_artist(
    State(state): State<AppState>,
    AxumPath(artist_id): AxumPath<String>,
) -> ApiResult {
    state
        .catalog
        .delete_artist(&artist_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response::<()>("Artist deleted", None))
}
