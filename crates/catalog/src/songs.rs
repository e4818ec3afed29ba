use std::collections::HashMap;
use std::ops::RangeInclusive;

use common::{Album, Song, SongDraft, SongPatch};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ids::{next_id, timestamp};
use crate::probe::resolve_media_path;
use crate::store::Collection;
use crate::sync;
use crate::{Catalog, CatalogError};

pub const SEED_PLAY_COUNT_RANGE: RangeInclusive<u64> = 10_000..=5_000_000;

/// Validated body of a bulk album reassignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumAssignment {
    pub song_ids: Vec<String>,
    pub album_id: String,
}

impl AlbumAssignment {
    /// Accepts `{ "songIds": [..], "albumId": ".." }`; anything else is a
    /// validation error.
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let invalid = || CatalogError::Validation("Invalid data format".to_string());
        let song_ids = value
            .get("songIds")
            .and_then(Value::as_array)
            .ok_or_else(invalid)?
            .iter()
            .map(|id| id.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(invalid)?;
        let album_id = value
            .get("albumId")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(invalid)?
            .to_string();
        Ok(Self { song_ids, album_id })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub album_id: String,
    pub updated_count: usize,
}

impl Catalog {
    pub fn list_songs(&self) -> Result<Vec<Song>, CatalogError> {
        self.load()
    }

    pub fn get_song(&self, id: &str) -> Result<Song, CatalogError> {
        self.find(id)
    }

    /// Creates a song and, when it names an existing album, lists it there.
    pub fn create_song(&self, draft: SongDraft) -> Result<Song, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs, Collection::Albums]);
        let mut songs: Vec<Song> = self.load()?;
        let mut albums: Vec<Album> = self.load()?;

        let mut song = draft.into_song(next_id(&songs), timestamp());
        if song.duration == 0 {
            if let Some(duration) = self.probe_song_file(&song) {
                song.duration = duration;
            }
        }

        if sync::link_new_song(&mut albums, &song.id, song.album_id.as_deref()) {
            self.save(&albums)?;
        } else if let Some(album_id) = song.album_id.as_deref() {
            warn!("Song {} references unknown album {}", song.id, album_id);
        }

        songs.push(song.clone());
        self.save(&songs)?;
        info!("Created song {} ({})", song.id, song.title);
        Ok(song)
    }

    /// Applies a partial update. The album link is only re-synchronized when
    /// the payload carries an `albumId` (null included).
    pub fn update_song(&self, id: &str, patch: SongPatch) -> Result<Song, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs, Collection::Albums]);
        let mut songs: Vec<Song> = self.load()?;
        let mut albums: Vec<Album> = self.load()?;

        let song = songs
            .iter_mut()
            .find(|song| song.id == id)
            .ok_or(CatalogError::NotFound("Song"))?;
        let old_album = song.album_id.clone();
        let requested_album = patch.album_id.clone();
        patch.apply_to(song);
        let updated = song.clone();

        if let Some(new_album) = requested_album {
            if sync::move_song(&mut albums, id, old_album.as_deref(), new_album.as_deref()) {
                self.save(&albums)?;
                debug!(
                    "Moved song {} from {:?} to {:?}",
                    id, old_album, new_album
                );
            }
        }

        self.save(&songs)?;
        Ok(updated)
    }

    /// Removes the song and scrubs its id from every album.
    pub fn delete_song(&self, id: &str) -> Result<Song, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs, Collection::Albums]);
        let mut songs: Vec<Song> = self.load()?;
        let mut albums: Vec<Album> = self.load()?;

        let index = songs
            .iter()
            .position(|song| song.id == id)
            .ok_or(CatalogError::NotFound("Song"))?;
        let removed = songs.remove(index);

        if sync::purge_song(&mut albums, id) {
            self.save(&albums)?;
        }
        self.save(&songs)?;
        info!("Deleted song {} ({})", removed.id, removed.title);
        Ok(removed)
    }

    /// Points many songs at one album without cleaning up the albums they
    /// came from.
    pub fn assign_album(
        &self,
        assignment: AlbumAssignment,
    ) -> Result<AssignmentOutcome, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs, Collection::Albums]);
        let mut songs: Vec<Song> = self.load()?;
        let mut albums: Vec<Album> = self.load()?;

        let outcome = sync::assign_songs(
            &mut songs,
            &mut albums,
            &assignment.song_ids,
            &assignment.album_id,
        );
        if outcome.songs_changed {
            self.save(&songs)?;
        }
        if outcome.album_changed {
            self.save(&albums)?;
        }
        info!(
            "Assigned {} songs to album {}",
            outcome.matched, assignment.album_id
        );
        Ok(AssignmentOutcome {
            album_id: assignment.album_id,
            updated_count: outcome.matched,
        })
    }

    /// Gives every song without plays a random count and writes the result.
    /// Returns how many songs were filled in.
    pub fn seed_play_counts(&self) -> Result<usize, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs]);
        let mut songs: Vec<Song> = self.load()?;
        let updated = backfill_play_counts(&mut songs, SEED_PLAY_COUNT_RANGE, &mut rand::rng());
        if updated > 0 {
            self.save(&songs)?;
        }
        info!("Seeded play counts for {} songs", updated);
        Ok(updated)
    }

    /// Detaches the audio file: url cleared, duration back to unknown.
    pub fn clear_song_url(&self, id: &str) -> Result<Song, CatalogError> {
        self.modify::<Song>(id, |song| {
            song.url = None;
            song.duration = 0;
        })
    }

    /// Probes the media file of every song that has a url but no duration.
    /// Returns how many songs received one.
    pub fn sync_durations(&self) -> Result<usize, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs]);
        let mut songs: Vec<Song> = self.load()?;
        let mut probed: HashMap<String, u64> = HashMap::new();

        for song in songs.iter().filter(|song| song.url.is_some() && song.duration == 0) {
            match self.probe_song_file(song) {
                Some(duration) => {
                    probed.insert(song.id.clone(), duration);
                }
                None => debug!("No duration found for song {}", song.id),
            }
        }

        for song in songs.iter_mut() {
            if let Some(duration) = probed.get(&song.id) {
                song.duration = *duration;
            }
        }
        if !probed.is_empty() {
            self.save(&songs)?;
        }
        info!("Synced durations for {} songs", probed.len());
        Ok(probed.len())
    }

    fn probe_song_file(&self, song: &Song) -> Option<u64> {
        let media_root = self.media_root.as_deref()?;
        let url = song.url.as_deref()?;
        let path = match resolve_media_path(media_root, url) {
            Some(path) => path,
            None => {
                debug!("Song {} url {} is not a local media file", song.id, url);
                return None;
            }
        };
        if !path.is_file() {
            warn!("Media file missing for song {}: {}", song.id, path.display());
            return None;
        }
        self.probe.extract_duration(&path).filter(|secs| *secs > 0)
    }
}

pub(crate) fn backfill_play_counts<R: Rng>(
    songs: &mut [Song],
    range: RangeInclusive<u64>,
    rng: &mut R,
) -> usize {
    let mut updated = 0;
    for song in songs.iter_mut().filter(|song| song.play_count == 0) {
        song.play_count = rng.random_range(range.clone());
        updated += 1;
    }
    updated
}
