//! Keeps `Song::album_id` and `Album::songs` pointing at each other.
//!
//! Every function here works on collections already loaded in memory and
//! reports whether it changed anything, so callers only write back the
//! documents that actually moved.

use std::collections::HashSet;

use common::{Album, Song};

/// Adds a newly created song to its album. A dangling `album_id` is left as
/// is and nothing changes.
pub fn link_new_song(albums: &mut [Album], song_id: &str, album_id: Option<&str>) -> bool {
    let Some(album_id) = album_id else {
        return false;
    };
    match albums.iter_mut().find(|album| album.id == album_id) {
        Some(album) => push_unique(&mut album.songs, song_id),
        None => false,
    }
}

/// Moves a song from `old` to `new`: drop it from the old album, then add it
/// to the new one unless it is already listed there.
pub fn move_song(
    albums: &mut [Album],
    song_id: &str,
    old: Option<&str>,
    new: Option<&str>,
) -> bool {
    if old == new {
        return false;
    }
    let mut changed = false;
    if let Some(old) = old {
        if let Some(album) = albums.iter_mut().find(|album| album.id == old) {
            changed |= remove_all(&mut album.songs, song_id);
        }
    }
    if let Some(new) = new {
        if let Some(album) = albums.iter_mut().find(|album| album.id == new) {
            changed |= push_unique(&mut album.songs, song_id);
        }
    }
    changed
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Assignment {
    /// Songs from the request that exist in the collection.
    pub matched: usize,
    pub songs_changed: bool,
    pub album_changed: bool,
}

/// Bulk "set and add": points every listed song at `album_id` and appends
/// the matched ids to that album. Albums the songs came from are left alone.
pub fn assign_songs(
    songs: &mut [Song],
    albums: &mut [Album],
    song_ids: &[String],
    album_id: &str,
) -> Assignment {
    let wanted: HashSet<&str> = song_ids.iter().map(String::as_str).collect();
    let mut outcome = Assignment::default();
    let mut matched_ids = HashSet::new();

    for song in songs.iter_mut() {
        if !wanted.contains(song.id.as_str()) {
            continue;
        }
        outcome.matched += 1;
        matched_ids.insert(song.id.clone());
        if song.album_id.as_deref() != Some(album_id) {
            song.album_id = Some(album_id.to_string());
            outcome.songs_changed = true;
        }
    }

    if outcome.matched == 0 {
        return outcome;
    }

    if let Some(album) = albums.iter_mut().find(|album| album.id == album_id) {
        for song_id in song_ids {
            if matched_ids.contains(song_id) {
                outcome.album_changed |= push_unique(&mut album.songs, song_id);
            }
        }
    }
    outcome
}

/// Strips a deleted song from every album, not only the one it claimed.
pub fn purge_song(albums: &mut [Album], song_id: &str) -> bool {
    let mut changed = false;
    for album in albums.iter_mut() {
        changed |= remove_all(&mut album.songs, song_id);
    }
    changed
}

/// Clears `album_id` on every song of a deleted album. Returns how many songs
/// were unlinked.
pub fn unlink_album(songs: &mut [Song], album_id: &str) -> usize {
    let mut unlinked = 0;
    for song in songs.iter_mut() {
        if song.album_id.as_deref() == Some(album_id) {
            song.album_id = None;
            unlinked += 1;
        }
    }
    unlinked
}

fn push_unique(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        false
    } else {
        ids.push(id.to_string());
        true
    }
}

fn remove_all(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}

#[cfg(test)]
mod tests {
    use common::{Album, Song};

    use super::*;

    fn album(id: &str, songs: &[&str]) -> Album {
        Album {
            id: id.to_string(),
            songs: songs.iter().map(|id| id.to_string()).collect(),
            ..Album::default()
        }
    }

    fn song(id: &str, album_id: Option<&str>) -> Song {
        Song {
            id: id.to_string(),
            album_id: album_id.map(str::to_string),
            ..Song::default()
        }
    }

    #[test]
    fn new_song_joins_existing_album() {
        let mut albums = vec![album("alb1", &[])];
        assert!(link_new_song(&mut albums, "s1", Some("alb1")));
        assert_eq!(albums[0].songs, vec!["s1"]);
    }

    #[test]
    fn new_song_with_unknown_album_changes_nothing() {
        let mut albums = vec![album("alb1", &[])];
        assert!(!link_new_song(&mut albums, "s1", Some("ghost")));
        assert!(!link_new_song(&mut albums, "s1", None));
        assert!(albums[0].songs.is_empty());
    }

    #[test]
    fn move_between_albums() {
        let mut albums = vec![album("alb1", &["s0", "s1"]), album("alb2", &["s9"])];
        assert!(move_song(&mut albums, "s1", Some("alb1"), Some("alb2")));
        assert_eq!(albums[0].songs, vec!["s0"]);
        assert_eq!(albums[1].songs, vec!["s9", "s1"]);
    }

    #[test]
    fn move_is_idempotent_on_target() {
        let mut albums = vec![album("alb1", &["s1"]), album("alb2", &["s1"])];
        assert!(move_song(&mut albums, "s1", Some("alb1"), Some("alb2")));
        assert_eq!(albums[1].songs, vec!["s1"]);
        assert!(albums[0].songs.is_empty());
    }

    #[test]
    fn move_to_none_only_removes() {
        let mut albums = vec![album("alb1", &["s1"])];
        assert!(move_song(&mut albums, "s1", Some("alb1"), None));
        assert!(albums[0].songs.is_empty());
    }

    #[test]
    fn move_to_same_album_is_noop() {
        let mut albums = vec![album("alb1", &[])];
        assert!(!move_song(&mut albums, "s1", Some("alb1"), Some("alb1")));
        assert!(albums[0].songs.is_empty());
    }

    #[test]
    fn bulk_assignment_keeps_previous_album() {
        let mut songs = vec![song("s2", Some("alb0")), song("s3", None), song("s4", None)];
        let mut albums = vec![album("alb0", &["s2"]), album("alb1", &["s3"])];
        let ids = vec!["s2".to_string(), "s3".to_string(), "ghost".to_string()];

        let outcome = assign_songs(&mut songs, &mut albums, &ids, "alb1");

        assert_eq!(outcome.matched, 2);
        assert!(outcome.songs_changed);
        assert!(outcome.album_changed);
        assert_eq!(songs[0].album_id.as_deref(), Some("alb1"));
        assert_eq!(songs[1].album_id.as_deref(), Some("alb1"));
        assert_eq!(songs[2].album_id, None);
        assert_eq!(albums[0].songs, vec!["s2"]);
        assert_eq!(albums[1].songs, vec!["s3", "s2"]);
    }

    #[test]
    fn bulk_assignment_without_matches_touches_nothing() {
        let mut songs = vec![song("s1", None)];
        let mut albums = vec![album("alb1", &[])];
        let outcome = assign_songs(&mut songs, &mut albums, &["nope".to_string()], "alb1");
        assert_eq!(outcome, Assignment::default());
        assert!(albums[0].songs.is_empty());
    }

    #[test]
    fn purge_scans_every_album() {
        let mut albums = vec![album("a", &["s1", "s2"]), album("b", &["s1"]), album("c", &[])];
        assert!(purge_song(&mut albums, "s1"));
        assert_eq!(albums[0].songs, vec!["s2"]);
        assert!(albums[1].songs.is_empty());
        assert!(!purge_song(&mut albums, "s1"));
    }

    #[test]
    fn unlink_resets_only_matching_songs() {
        let mut songs = vec![song("s1", Some("a")), song("s2", Some("b")), song("s3", Some("a"))];
        assert_eq!(unlink_album(&mut songs, "a"), 2);
        assert_eq!(songs[0].album_id, None);
        assert_eq!(songs[1].album_id.as_deref(), Some("b"));
        assert_eq!(songs[2].album_id, None);
    }
}
