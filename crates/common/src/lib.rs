use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_SONG_TITLE: &str = "New Track";
pub const DEFAULT_SONG_ARTIST: &str = "Unknown Artist";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(default, deserialize_with = "text")]
    pub id: String,
    #[serde(default, deserialize_with = "text")]
    pub title: String,
    #[serde(default, deserialize_with = "text")]
    pub artist: String,
    #[serde(default, deserialize_with = "reference")]
    pub artist_id: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub album_id: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "count")]
    pub duration: u64,
    #[serde(default, deserialize_with = "text")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "text")]
    pub description: String,
    #[serde(default, deserialize_with = "count")]
    pub play_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(default, deserialize_with = "text")]
    pub id: String,
    #[serde(default, deserialize_with = "text")]
    pub title: String,
    /// Shown as the artist name of every track played from this album.
    #[serde(default, deserialize_with = "text")]
    pub description: String,
    #[serde(default, deserialize_with = "text")]
    pub cover: String,
    #[serde(default, deserialize_with = "reference")]
    pub artist_id: Option<String>,
    #[serde(default, deserialize_with = "id_list")]
    pub songs: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    #[serde(default, deserialize_with = "text")]
    pub id: String,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "count")]
    pub followers: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, deserialize_with = "text")]
    pub id: String,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDraft {
    pub title: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub artist_id: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub album_id: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
}

impl SongDraft {
    /// Resolves every field through its fallback chain. `playCount` always
    /// starts at zero.
    pub fn into_song(self, id: String, created_at: String) -> Song {
        let title = first_filled(&[&self.title, &self.name])
            .unwrap_or(DEFAULT_SONG_TITLE)
            .to_string();
        let artist = first_filled(&[&self.artist, &self.description])
            .unwrap_or(DEFAULT_SONG_ARTIST)
            .to_string();
        Song {
            id,
            title,
            artist,
            artist_id: self.artist_id,
            album_id: self.album_id,
            category_id: self.category_id,
            url: self.url,
            duration: self.duration.unwrap_or(0),
            thumbnail: self.thumbnail.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            play_count: 0,
            created_at: Some(created_at),
            extra: Map::new(),
        }
    }
}

/// Partial song update. For the nullable references the outer `Option` tells
/// whether the field was present in the payload at all.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPatch {
    pub title: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    #[serde(default, deserialize_with = "nullable_reference")]
    pub artist_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_reference")]
    pub album_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_reference")]
    pub category_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_reference")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "optional_count")]
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub play_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SongPatch {
    pub fn apply_to(self, song: &mut Song) {
        if let Some(title) = self.title {
            song.title = title;
        }
        if let Some(name) = self.name.filter(|value| !value.trim().is_empty()) {
            song.title = name;
        }
        if let Some(artist) = self.artist {
            song.artist = artist;
        }
        if let Some(artist_id) = self.artist_id {
            song.artist_id = artist_id;
        }
        if let Some(album_id) = self.album_id {
            song.album_id = album_id;
        }
        if let Some(category_id) = self.category_id {
            song.category_id = category_id;
        }
        if let Some(url) = self.url {
            song.url = url;
        }
        if let Some(duration) = self.duration {
            song.duration = duration;
        }
        if let Some(thumbnail) = self.thumbnail {
            song.thumbnail = thumbnail;
        }
        if let Some(description) = self.description {
            song.description = description;
        }
        if let Some(play_count) = self.play_count {
            song.play_count = play_count;
        }
        merge_extra(&mut song.extra, self.extra, &["createdAt"]);
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "reference")]
    pub artist_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlbumDraft {
    /// Membership is owned by the song operations, so a new album is always
    /// empty whatever the payload says.
    pub fn into_album(self, id: String) -> Album {
        let mut album = Album {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            cover: self.cover.unwrap_or_default(),
            artist_id: self.artist_id,
            songs: Vec::new(),
            extra: Map::new(),
        };
        merge_extra(&mut album.extra, self.extra, &["songs"]);
        album
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "nullable_reference")]
    pub artist_id: Option<Option<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AlbumPatch {
    pub fn apply_to(self, album: &mut Album) {
        if let Some(title) = self.title {
            album.title = title;
        }
        if let Some(description) = self.description {
            album.description = description;
        }
        if let Some(cover) = self.cover {
            album.cover = cover;
        }
        if let Some(artist_id) = self.artist_id {
            album.artist_id = artist_id;
        }
        merge_extra(&mut album.extra, self.extra, &["songs"]);
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDraft {
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArtistDraft {
    pub fn into_artist(self, id: String) -> Artist {
        let mut artist = Artist {
            id,
            name: self.name.unwrap_or_default(),
            followers: 0,
            extra: Map::new(),
        };
        merge_extra(&mut artist.extra, self.extra, &["followers", "topTracks"]);
        artist
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    pub followers: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ArtistPatch {
    pub fn apply_to(self, artist: &mut Artist) {
        if let Some(name) = self.name {
            artist.name = name;
        }
        if let Some(followers) = self.followers {
            artist.followers = followers;
        }
        merge_extra(&mut artist.extra, self.extra, &["topTracks"]);
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CategoryDraft {
    pub fn into_category(self, id: String) -> Category {
        let mut category = Category {
            id,
            name: self.name.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            extra: Map::new(),
        };
        merge_extra(&mut category.extra, self.extra, &[]);
        category
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CategoryPatch {
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(color) = self.color {
            category.color = color;
        }
        merge_extra(&mut category.extra, self.extra, &[]);
    }
}

/// Shallow-merges free-form fields. `id` and the `reserved` keys never make it
/// into a stored record, which is what keeps ids immutable across updates.
pub fn merge_extra(target: &mut Map<String, Value>, incoming: Map<String, Value>, reserved: &[&str]) {
    for (key, value) in incoming {
        if key == "id" || reserved.contains(&key.as_str()) {
            continue;
        }
        target.insert(key, value);
    }
}

fn first_filled<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|value| value.as_deref())
        .find(|value| !value.trim().is_empty())
}

/// Older documents were written by hand and by clients that sent numbers
/// where strings belong, so scalars are stringified instead of rejected.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn scalar_count(value: Value) -> u64 {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(number) if number.is_finite() && number > 0.0 => number.round() as u64,
        _ => 0,
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)
        .map(scalar_text)?
        .unwrap_or_default())
}

fn reference<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer).map(scalar_text)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

fn nullable_reference<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    reference(deserializer).map(Some)
}

/// `null`, negatives and non-numeric text count as zero; fractions round.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(scalar_count)
}

fn optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    count(deserializer).map(Some)
}

fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    };
    Ok(ids)
}
