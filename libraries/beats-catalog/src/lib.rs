//! Beats - Catalog
//!
//! Song catalog, mood sections, type-ahead search and the favorites list.
//!
//! # Example
//!
//! ```rust
//! use beats_catalog::Catalog;
//!
//! let catalog = Catalog::seeded();
//! let hits = catalog.search("sid sriram");
//! assert_eq!(hits.len(), 2);
//! ```

mod catalog;
mod error;
mod favorites;

pub use catalog::{Catalog, Section, SectionKind, MAX_SUGGESTIONS};
pub use error::{CatalogError, Result};
pub use favorites::{FavoritesStore, FAVORITES_FILENAME};
