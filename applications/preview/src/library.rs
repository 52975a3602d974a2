//! Catalog and favorites as configured

use crate::config::LibrarySettings;
use crate::error::{PreviewError, Result};
use beats_catalog::{Catalog, FavoritesStore};
use beats_core::{Track, TrackId};

pub struct Library {
    pub catalog: Catalog,
    pub favorites: FavoritesStore,
}

impl Library {
    /// Open the configured catalog (built-in songs when unset) and favorites
    pub fn open(settings: &LibrarySettings) -> Result<Self> {
        let catalog = match &settings.catalog {
            Some(path) => Catalog::from_json_file(path)?,
            None => Catalog::seeded(),
        };
        tracing::debug!(tracks = catalog.len(), "catalog opened");

        Ok(Self {
            catalog,
            favorites: FavoritesStore::load(&settings.favorites),
        })
    }

    pub fn track(&self, id: &str) -> Result<&Track> {
        self.catalog
            .get(&TrackId::new(id))
            .ok_or_else(|| PreviewError::TrackNotFound(id.to_string()))
    }

    /// Flip the favorite flag of `id` and persist; true when now a favorite
    pub fn toggle_favorite(&mut self, id: &str) -> Result<bool> {
        let track = self
            .catalog
            .get(&TrackId::new(id))
            .ok_or_else(|| PreviewError::TrackNotFound(id.to_string()))?;

        let added = self.favorites.toggle(track);
        self.favorites.save()?;
        Ok(added)
    }
}
