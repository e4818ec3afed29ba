use std::collections::HashMap;

use common::{Album, Song};
use serde::Serialize;
use serde_json::{Map, Value};

/// An album with its track ids replaced by the tracks themselves, each track
/// dressed in the album's artist, artwork and id.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub artist_id: Option<String>,
    pub songs: Vec<Song>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn hydrate_album(album: &Album, songs: &[Song]) -> AlbumView {
    let mut by_id: HashMap<&str, &Song> = HashMap::with_capacity(songs.len());
    for song in songs {
        // A duplicated id resolves to the first record, as every other lookup does.
        by_id.entry(song.id.as_str()).or_insert(song);
    }
    let tracks = album
        .songs
        .iter()
        .filter_map(|song_id| by_id.get(song_id.as_str()))
        .map(|song| album_track(album, song))
        .collect();

    AlbumView {
        id: album.id.clone(),
        title: album.title.clone(),
        description: album.description.clone(),
        cover: album.cover.clone(),
        artist_id: album.artist_id.clone(),
        songs: tracks,
        extra: album.extra.clone(),
    }
}

fn album_track(album: &Album, song: &Song) -> Song {
    let mut track = song.clone();
    if !album.description.is_empty() {
        track.artist = album.description.clone();
    }
    if let Some(artist_id) = album.artist_id.as_ref().filter(|id| !id.is_empty()) {
        track.artist_id = Some(artist_id.clone());
    }
    if !album.cover.is_empty() {
        track.thumbnail = album.cover.clone();
    }
    track.album_id = Some(album.id.clone());
    track
}
