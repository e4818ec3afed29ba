use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use common::{Album, Artist, Category, Song};
use parking_lot::{Mutex, MutexGuard};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    Songs,
    Albums,
    Artists,
    Categories,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Songs => "songs",
            Collection::Albums => "albums",
            Collection::Artists => "artists",
            Collection::Categories => "categories",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whole-document persistence. Every call reads or replaces one complete
/// collection; there is no record-level access.
pub trait DocumentStore: Send + Sync {
    /// Returns an empty sequence when the document does not exist yet.
    fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError>;
    fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError>;
}

/// A record type bound to the collection document that holds it.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
    const LABEL: &'static str;

    fn id(&self) -> &str;
}

impl Record for Song {
    const COLLECTION: Collection = Collection::Songs;
    const LABEL: &'static str = "Song";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Album {
    const COLLECTION: Collection = Collection::Albums;
    const LABEL: &'static str = "Album";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Artist {
    const COLLECTION: Collection = Collection::Artists;
    const LABEL: &'static str = "Artist";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Category {
    const COLLECTION: Collection = Collection::Categories;
    const LABEL: &'static str = "Category";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One JSON array per collection, `<root>/<collection>.json`.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let path = self.path_for(collection);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if bytes.iter().all(|byte| byte.is_ascii_whitespace()) {
            return Ok(Vec::new());
        }
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Array(records) => Ok(records),
            Value::Null => Ok(Vec::new()),
            _ => Err(StoreError::NotASequence(collection)),
        }
    }

    fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
        let path = self.path_for(collection);
        let tmp_path = self.root.join(format!("{}.tmp", collection.file_name()));
        let bytes = serde_json::to_vec_pretty(records)?;
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Collection, Vec<Value>>>,
    saves: Mutex<HashMap<Collection, usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, collection: Collection, records: Vec<Value>) {
        self.documents.lock().insert(collection, records);
    }

    pub fn document(&self, collection: Collection) -> Vec<Value> {
        self.documents
            .lock()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of `save` calls made for `collection` since creation.
    pub fn save_count(&self, collection: Collection) -> usize {
        self.saves.lock().get(&collection).copied().unwrap_or(0)
    }
}

impl DocumentStore for MemoryStore {
    fn load(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        Ok(self.document(collection))
    }

    fn save(&self, collection: Collection, records: &[Value]) -> Result<(), StoreError> {
        self.documents.lock().insert(collection, records.to_vec());
        *self.saves.lock().entry(collection).or_insert(0) += 1;
        Ok(())
    }
}

/// Single-writer discipline per collection document.
#[derive(Default)]
pub struct WriteLocks {
    songs: Mutex<()>,
    albums: Mutex<()>,
    artists: Mutex<()>,
    categories: Mutex<()>,
}

impl WriteLocks {
    /// Acquires the locks of every listed collection in the fixed
    /// `Collection` order, so two writers can never wait on each other in a
    /// cycle.
    pub fn acquire(&self, collections: &[Collection]) -> Vec<MutexGuard<'_, ()>> {
        let mut wanted = collections.to_vec();
        wanted.sort();
        wanted.dedup();
        wanted
            .into_iter()
            .map(|collection| self.lock_for(collection).lock())
            .collect()
    }

    fn lock_for(&self, collection: Collection) -> &Mutex<()> {
        match collection {
            Collection::Songs => &self.songs,
            Collection::Albums => &self.albums,
            Collection::Artists => &self.artists,
            Collection::Categories => &self.categories,
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotASequence(Collection),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(err) => write!(f, "io error: {}", err),
            StoreError::Json(err) => write!(f, "json error: {}", err),
            StoreError::NotASequence(collection) => {
                write!(f, "{} document is not a JSON array", collection)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(err) => Some(err),
            StoreError::Json(err) => Some(err),
            StoreError::NotASequence(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Json(err)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Collection, DocumentStore, JsonFileStore, StoreError, WriteLocks};

    #[test]
    fn missing_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.load(Collection::Songs).unwrap().is_empty());
    }

    #[test]
    fn save_replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("db")).unwrap();
        store
            .save(Collection::Albums, &[json!({ "id": "a" }), json!({ "id": "b" })])
            .unwrap();
        store
            .save(Collection::Albums, &[json!({ "id": "c" })])
            .unwrap();

        let loaded = store.load(Collection::Albums).unwrap();
        assert_eq!(loaded, vec![json!({ "id": "c" })]);

        let raw = std::fs::read_to_string(store.path_for(Collection::Albums)).unwrap();
        assert!(raw.contains("\n  {"), "expected two-space indentation: {raw}");
        assert!(!store.root().join("albums.json.tmp").exists());
    }

    #[test]
    fn blank_document_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        std::fs::write(store.path_for(Collection::Artists), "  \n").unwrap();
        assert!(store.load(Collection::Artists).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        std::fs::write(store.path_for(Collection::Categories), "{\"id\":1}").unwrap();
        let err = store.load(Collection::Categories).unwrap_err();
        assert!(matches!(err, StoreError::NotASequence(Collection::Categories)));
    }

    #[test]
    fn acquires_each_collection_once() {
        let locks = WriteLocks::default();
        let guards = locks.acquire(&[Collection::Albums, Collection::Songs, Collection::Albums]);
        assert_eq!(guards.len(), 2);
        drop(guards);
        assert_eq!(locks.acquire(&[Collection::Albums]).len(), 1);
    }
}
