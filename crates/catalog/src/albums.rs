use common::{Album, AlbumDraft, AlbumPatch, Song};
use tracing::info;

use crate::hydrate::{hydrate_album, AlbumView};
use crate::store::Collection;
use crate::sync;
use crate::{Catalog, CatalogError};

impl Catalog {
    pub fn list_albums(&self) -> Result<Vec<Album>, CatalogError> {
        self.load()
    }

    pub fn get_album(&self, id: &str) -> Result<Album, CatalogError> {
        self.find(id)
    }

    /// The album with its tracks resolved, in album order.
    pub fn album_detail(&self, id: &str) -> Result<AlbumView, CatalogError> {
        let album: Album = self.find(id)?;
        let songs: Vec<Song> = self.load()?;
        Ok(hydrate_album(&album, &songs))
    }

    pub fn create_album(&self, draft: AlbumDraft) -> Result<Album, CatalogError> {
        let album = self.insert(|id| draft.into_album(id))?;
        info!("Created album {} ({})", album.id, album.title);
        Ok(album)
    }

    pub fn update_album(&self, id: &str, patch: AlbumPatch) -> Result<Album, CatalogError> {
        self.modify(id, |album| patch.apply_to(album))
    }

    /// Removes the album and detaches every song that pointed at it.
    pub fn delete_album(&self, id: &str) -> Result<Album, CatalogError> {
        let _guards = self.locks.acquire(&[Collection::Songs, Collection::Albums]);
        let mut albums: Vec<Album> = self.load()?;
        let mut songs: Vec<Song> = self.load()?;

        let index = albums
            .iter()
            .position(|album| album.id == id)
            .ok_or(CatalogError::NotFound("Album"))?;
        let removed = albums.remove(index);

        let unlinked = sync::unlink_album(&mut songs, id);
        if unlinked > 0 {
            self.save(&songs)?;
        }
        self.save(&albums)?;
        info!("Deleted album {}; unlinked {} songs", removed.id, unlinked);
        Ok(removed)
    }
}
