use std::ops::RangeInclusive;

use common::{Artist, ArtistDraft, ArtistPatch, Song};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::songs::backfill_play_counts;
use crate::{Catalog, CatalogError};

pub const TOP_TRACK_LIMIT: usize = 10;

/// Play counts shown for top tracks that have never been played. Display
/// only; the stored songs keep their zero.
const DISPLAY_PLAY_COUNT_RANGE: RangeInclusive<u64> = 500_000..=5_000_000;

#[derive(Clone, Debug, Serialize)]
pub struct ArtistView {
    #[serde(flatten)]
    pub artist: Artist,
    #[serde(rename = "topTracks")]
    pub top_tracks: Vec<Song>,
}

impl Catalog {
    pub fn list_artists(&self) -> Result<Vec<Artist>, CatalogError> {
        self.load()
    }

    pub fn get_artist(&self, id: &str) -> Result<Artist, CatalogError> {
        self.find(id)
    }

    /// The artist together with up to [`TOP_TRACK_LIMIT`] of their tracks.
    pub fn artist_detail(&self, id: &str) -> Result<ArtistView, CatalogError> {
        let artist = self.get_artist(id)?;
        let songs: Vec<Song> = self.load()?;
        let top_tracks = top_tracks(&artist, &songs, &mut rand::rng());
        Ok(ArtistView { artist, top_tracks })
    }

    pub fn create_artist(&self, draft: ArtistDraft) -> Result<Artist, CatalogError> {
        let artist = self.insert(|id| draft.into_artist(id))?;
        info!("Created artist {} ({})", artist.id, artist.name);
        Ok(artist)
    }

    pub fn update_artist(&self, id: &str, patch: ArtistPatch) -> Result<Artist, CatalogError> {
        self.modify(id, |artist| patch.apply_to(artist))
    }

    pub fn delete_artist(&self, id: &str) -> Result<Artist, CatalogError> {
        let removed: Artist = self.remove(id)?;
        info!("Deleted artist {} ({})", removed.id, removed.name);
        Ok(removed)
    }
}

fn top_tracks<R: Rng>(artist: &Artist, songs: &[Song], rng: &mut R) -> Vec<Song> {
    let mut tracks: Vec<Song> = songs
        .iter()
        .filter(|song| performed_by(song, artist))
        .take(TOP_TRACK_LIMIT)
        .cloned()
        .collect();
    backfill_play_counts(&mut tracks, DISPLAY_PLAY_COUNT_RANGE, rng);
    tracks
}

fn performed_by(song: &Song, artist: &Artist) -> bool {
    if song.artist_id.as_deref() == Some(artist.id.as_str()) {
        return true;
    }
    !artist.name.is_empty() && song.artist.to_lowercase() == artist.name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use common::{ArtistDraft, ArtistPatch};
    use serde_json::json;

    use super::{DISPLAY_PLAY_COUNT_RANGE, TOP_TRACK_LIMIT};
    use crate::store::{Collection, DocumentStore};
    use crate::testing::catalog_with;
    use crate::CatalogError;

    #[test]
    fn top_tracks_match_by_id_or_name() {
        let (catalog, store) = catalog_with(vec![
            (
                Collection::Artists,
                json!([{ "id": "ar1", "name": "The Band", "followers": 12 }]),
            ),
            (
                Collection::Songs,
                json!([
                    { "id": "s1", "artistId": "ar1", "artist": "Someone Else", "playCount": 40 },
                    { "id": "s2", "artist": "the band" },
                    { "id": "s3", "artist": "Another Band" },
                    { "id": "s4", "artist": "THE BAND", "playCount": 7 },
                ]),
            ),
        ]);

        let view = catalog.artist_detail("ar1").unwrap();
        let ids: Vec<&str> = view.top_tracks.iter().map(|song| song.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s4"]);
        assert_eq!(view.top_tracks[0].play_count, 40);
        assert!(DISPLAY_PLAY_COUNT_RANGE.contains(&view.top_tracks[1].play_count));
        assert_eq!(view.top_tracks[2].play_count, 7);

        let stored = store.load(Collection::Songs).unwrap();
        assert!(stored[1].get("playCount").is_none());
        assert_eq!(catalog.get_song("s2").unwrap().play_count, 0);
        assert_eq!(store.save_count(Collection::Songs), 0);

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["name"], "The Band");
        assert_eq!(value["followers"], 12);
        assert_eq!(value["topTracks"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn top_tracks_are_capped() {
        let songs: Vec<_> = (0..15)
            .map(|i| json!({ "id": format!("s{i}"), "artistId": "ar1", "playCount": 1 }))
            .collect();
        let (catalog, _) = catalog_with(vec![
            (Collection::Artists, json!([{ "id": "ar1", "name": "Solo" }])),
            (Collection::Songs, json!(songs)),
        ]);
        let view = catalog.artist_detail("ar1").unwrap();
        assert_eq!(view.top_tracks.len(), TOP_TRACK_LIMIT);
        assert_eq!(view.top_tracks[0].id, "s0");
        assert_eq!(view.top_tracks[9].id, "s9");
    }

    #[test]
    fn nameless_artist_does_not_claim_nameless_tracks() {
        let (catalog, _) = catalog_with(vec![
            (Collection::Artists, json!([{ "id": "ar1" }])),
            (Collection::Songs, json!([{ "id": "s1", "artist": "" }])),
        ]);
        assert!(catalog.artist_detail("ar1").unwrap().top_tracks.is_empty());
    }

    #[test]
    fn create_update_delete() {
        let (catalog, _) = catalog_with(vec![]);
        let draft: ArtistDraft =
            serde_json::from_value(json!({ "name": "New", "followers": 999, "topTracks": [] }))
                .unwrap();
        let artist = catalog.create_artist(draft).unwrap();
        assert_eq!(artist.followers, 0);
        assert!(!artist.extra.contains_key("topTracks"));

        let patch: ArtistPatch =
            serde_json::from_value(json!({ "id": "zzz", "followers": 5, "genre": "jazz" })).unwrap();
        let updated = catalog.update_artist(&artist.id, patch).unwrap();
        assert_eq!(updated.id, artist.id);
        assert_eq!(updated.followers, 5);
        assert_eq!(updated.extra.get("genre"), Some(&json!("jazz")));

        catalog.delete_artist(&artist.id).unwrap();
        assert!(catalog.list_artists().unwrap().is_empty());
        assert!(matches!(
            catalog.delete_artist(&artist.id),
            Err(CatalogError::NotFound("Artist"))
        ));
        assert!(matches!(catalog.artist_detail("zzz"), Err(CatalogError::NotFound("Artist"))));
    }

    #[test]
    fn numeric_ids_do_not_break_the_collection() {
        let (catalog, _) = catalog_with(vec![
            (
                Collection::Artists,
                json!([{ "id": 7, "name": "Seven" }, { "id": "ar2", "name": "Two", "followers": null }]),
            ),
            (
                Collection::Songs,
                json!([
                    { "id": 1, "artistId": 7, "duration": null, "playCount": 3 },
                    { "id": "s2", "artist": "two", "duration": 215.4, "playCount": null },
                ]),
            ),
        ]);

        assert_eq!(catalog.list_artists().unwrap().len(), 2);
        let seven = catalog.artist_detail("7").unwrap();
        assert_eq!(seven.top_tracks.len(), 1);
        assert_eq!(seven.top_tracks[0].id, "1");
        assert_eq!(seven.top_tracks[0].play_count, 3);

        let two = catalog.artist_detail("ar2").unwrap();
        assert_eq!(two.artist.followers, 0);
        assert_eq!(two.top_tracks[0].duration, 215);
        assert_eq!(catalog.get_artist("7").unwrap().name, "Seven");
    }
}
