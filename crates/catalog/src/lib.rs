mod albums;
mod artists;
mod categories;
pub mod hydrate;
pub mod ids;
pub mod probe;
mod songs;
pub mod store;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use artists::{ArtistView, TOP_TRACK_LIMIT};
pub use hydrate::AlbumView;
pub use probe::{DurationProbe, LoftyProbe};
pub use songs::{AlbumAssignment, AssignmentOutcome};
pub use store::{Collection, DocumentStore, JsonFileStore, MemoryStore, StoreError};

use store::{Record, WriteLocks};

/// Entry point for every catalog operation.
///
/// Cloning is cheap; clones share the store and the per-collection write
/// locks, so mutating calls from different clones are serialized per
/// document.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    locks: Arc<WriteLocks>,
    probe: Arc<dyn DurationProbe>,
    media_root: Option<PathBuf>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            locks: Arc::new(WriteLocks::default()),
            probe: Arc::new(LoftyProbe),
            media_root: None,
        }
    }

    pub fn open(data_dir: &Path) -> Result<Self, CatalogError> {
        let store = JsonFileStore::open(data_dir)?;
        Ok(Self::new(Arc::new(store)))
    }

    pub fn with_probe(mut self, probe: Arc<dyn DurationProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Directory that song urls such as `public/music/a.mp3` resolve against
    /// when probing durations.
    pub fn with_media_root(mut self, media_root: impl Into<PathBuf>) -> Self {
        self.media_root = Some(media_root.into());
        self
    }

    pub fn media_root(&self) -> Option<&Path> {
        self.media_root.as_deref()
    }

    fn load<T: Record>(&self) -> Result<Vec<T>, CatalogError> {
        let raw = self.store.load(T::COLLECTION)?;
        let mut records = Vec::with_capacity(raw.len());
        for value in raw {
            records.push(serde_json::from_value(value)?);
        }
        Ok(records)
    }

    fn save<T: Record>(&self, records: &[T]) -> Result<(), CatalogError> {
        let mut raw = Vec::with_capacity(records.len());
        for record in records {
            raw.push(serde_json::to_value(record)?);
        }
        self.store.save(T::COLLECTION, &raw)?;
        Ok(())
    }

    fn find<T: Record>(&self, id: &str) -> Result<T, CatalogError> {
        self.load::<T>()?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or(CatalogError::NotFound(T::LABEL))
    }

    fn insert<T: Record + Clone>(&self, build: impl FnOnce(String) -> T) -> Result<T, CatalogError> {
        let _guards = self.locks.acquire(&[T::COLLECTION]);
        let mut records = self.load::<T>()?;
        let record = build(ids::next_id(&records));
        records.push(record.clone());
        self.save(&records)?;
        Ok(record)
    }

    fn modify<T: Record + Clone>(
        &self,
        id: &str,
        apply: impl FnOnce(&mut T),
    ) -> Result<T, CatalogError> {
        let _guards = self.locks.acquire(&[T::COLLECTION]);
        let mut records = self.load::<T>()?;
        let record = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or(CatalogError::NotFound(T::LABEL))?;
        apply(record);
        let updated = record.clone();
        self.save(&records)?;
        Ok(updated)
    }

    fn remove<T: Record>(&self, id: &str) -> Result<T, CatalogError> {
        let _guards = self.locks.acquire(&[T::COLLECTION]);
        let mut records = self.load::<T>()?;
        let index = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or(CatalogError::NotFound(T::LABEL))?;
        let removed = records.remove(index);
        self.save(&records)?;
        Ok(removed)
    }
}

#[derive(Debug)]
pub enum CatalogError {
    /// Carries the entity label, e.g. "Song".
    NotFound(&'static str),
    Validation(String),
    Storage(StoreError),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(label) => write!(f, "{} not found", label),
            CatalogError::Validation(message) => f.write_str(message),
            CatalogError::Storage(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        CatalogError::Storage(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Storage(StoreError::Json(err))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use serde_json::Value;

    use crate::probe::DurationProbe;
    use crate::store::{Collection, MemoryStore};
    use crate::Catalog;

    /// Answers from a fixed table instead of reading files.
    #[derive(Default)]
    pub struct FixedProbe {
        pub durations: HashMap<PathBuf, u64>,
    }

    impl DurationProbe for FixedProbe {
        fn extract_duration(&self, path: &Path) -> Option<u64> {
            self.durations.get(path).copied()
        }
    }

    pub fn catalog_with(documents: Vec<(Collection, Value)>) -> (Catalog, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        for (collection, records) in documents {
            let records = match records {
                Value::Array(records) => records,
                other => vec![other],
            };
            store.seed(collection, records);
        }
        let catalog = Catalog::new(store.clone()).with_probe(Arc::new(FixedProbe::default()));
        (catalog, store)
    }
}
