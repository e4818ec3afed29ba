use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    Json,
};
use catalog::AlbumAssignment;
use common::{SongDraft, SongPatch};
use serde_json::Value;

use crate::state::{AppState, UpdatedCount};
use crate::utils::{created_response, json_body, message_response, ok_response, ApiResult};

pub async fn list_songs(State(state): State<AppState>) -> ApiResult {
    let songs = state
        .catalog
        .list_songs()
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(songs))
}

pub async fn get_song(
    State(state): State<AppState>,
    AxumPath(song_id): AxumPath<String>,
) -> ApiResult {
    let song = state
        .catalog
        .get_song(&song_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(song))
}

pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<SongDraft>, JsonRejection>,
) -> ApiResult {
    let draft = json_body(payload)?;
    let song = state
        .catalog
        .create_song(draft)
        .map_err(|err| state.catalog_error(err))?;
    Ok(created_response(song))
}

pub async fn update_song(
    State(state): State<AppState>,
    AxumPath(song_id): AxumPath<String>,
    payload: Result<Json<SongPatch>, JsonRejection>,
) -> ApiResult {
    let patch = json_body(payload)?;
    let song = state
        .catalog
        .update_song(&song_id, patch)
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(song))
}

pub async fn delete_song(
    State(state): State<AppState>,
    AxumPath(song_id): AxumPath<String>,
) -> ApiResult {
    state
        .catalog
        .delete_song(&song_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response::<()>("Song deleted and removed from albums", None))
}

pub async fn assign_album(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult {
    let body = json_body(payload)?;
    let assignment = AlbumAssignment::from_value(&body).map_err(|err| state.catalog_error(err))?;
    let outcome = state
        .catalog
        .assign_album(assignment)
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response(
        format!("Updated {} songs.", outcome.updated_count),
        Some(outcome),
    ))
}

pub async fn seed_play_counts(State(state): State<AppState>) -> ApiResult {
    let updated_count = state
        .catalog
        .seed_play_counts()
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response(
        format!("Seeded play counts for {} songs.", updated_count),
        Some(UpdatedCount { updated_count }),
    ))
}

pub async fn sync_durations(State(state): State<AppState>) -> ApiResult {
    let updated_count = state
        .catalog
        .sync_durations()
        .map_err(|err| state.catalog_error(err))?;
    Ok(ok_response(UpdatedCount { updated_count }))
}

pub async fn clear_url(
    State(state): State<AppState>,
    AxumPath(song_id): AxumPath<String>,
) -> ApiResult {
    let song = state
        .catalog
        .clear_song_url(&song_id)
        .map_err(|err| state.catalog_error(err))?;
    Ok(message_response("Track URL cleared", Some(song)))
}
