//! Favorites store
//!
//! Favorites live in a JSON file holding the full track records, most
//! recently added first. A missing or unreadable file is an empty list; the
//! player keeps working and the next save rewrites it.

use crate::error::{CatalogError, Result};
use beats_core::{Track, TrackId};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default favorites filename
pub const FAVORITES_FILENAME: &str = "favorites.json";

/// Persistent list of favorite tracks
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
    tracks: Vec<Track>,
}

impl FavoritesStore {
    /// Load favorites from `path`
    ///
    /// Never fails: a missing file, an unreadable file and malformed JSON
    /// all yield an empty list (the latter two are logged).
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tracks = read_tracks(&path);
        Self { path, tracks }
    }

    /// File the store saves to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add `track` to the front if absent, remove it if present
    ///
    /// Returns whether the track is a favorite afterwards.
    pub fn toggle(&mut self, track: &Track) -> bool {
        if let Some(index) = self.tracks.iter().position(|t| t.id == track.id) {
            self.tracks.remove(index);
            false
        } else {
            self.tracks.insert(0, track.clone());
            true
        }
    }

    /// Whether the track with `id` is a favorite
    pub fn contains(&self, id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.id == id)
    }

    /// Number of favorites
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether there are no favorites
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Favorites, most recent first
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }

    /// Write the list to disk, creating the parent directory if needed
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }

        let file = File::create(&self.path).map_err(|e| CatalogError::io(&self.path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.tracks)?;
        writer.flush().map_err(|e| CatalogError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = self.tracks.len(), "favorites saved");
        Ok(())
    }
}

fn read_tracks(path: &Path) -> Vec<Track> {
    if !path.exists() {
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to open favorites file: {e}");
            return Vec::new();
        }
    };

    match serde_json::from_reader(BufReader::new(file)) {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring malformed favorites file: {e}");
            Vec::new()
        }
    }
}
