//! In-memory song catalog with search and mood sections

use crate::error::{CatalogError, Result};
use beats_core::{Mood, Track, TrackId};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Maximum number of search suggestions
pub const MAX_SUGGESTIONS: usize = 6;

/// Browse sections shown on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Songs tagged feel-good
    FeelGood,
    /// Songs tagged romantic
    Romantic,
    /// Songs tagged mass
    Mass,
    /// Every song
    Fresh,
}

impl SectionKind {
    /// All sections in display order
    pub const ALL: [SectionKind; 4] = [
        SectionKind::FeelGood,
        SectionKind::Romantic,
        SectionKind::Mass,
        SectionKind::Fresh,
    ];

    /// Stable key
    pub fn key(self) -> &'static str {
        match self {
            SectionKind::FeelGood => "feel-good",
            SectionKind::Romantic => "romantic",
            SectionKind::Mass => "mass",
            SectionKind::Fresh => "fresh",
        }
    }

    /// Display title
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::FeelGood => "Feel-Good Vibes",
            SectionKind::Romantic => "Heart Touching Melodies",
            SectionKind::Mass => "Mass Beats",
            SectionKind::Fresh => "Fresh Releases",
        }
    }

    fn admits(self, track: &Track) -> bool {
        match self {
            SectionKind::FeelGood => track.has_mood(&Mood::FeelGood),
            SectionKind::Romantic => track.has_mood(&Mood::Romantic),
            SectionKind::Mass => track.has_mood(&Mood::Mass),
            SectionKind::Fresh => true,
        }
    }
}

/// One browse section and its songs, in catalog order
#[derive(Debug, Clone, PartialEq)]
pub struct Section<'a> {
    /// Which section
    pub kind: SectionKind,
    /// Songs in it
    pub tracks: Vec<&'a Track>,
}

/// Song catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate IDs
    pub fn from_tracks(tracks: Vec<Track>) -> Result<Self> {
        let mut seen = HashSet::new();
        for track in &tracks {
            if !seen.insert(&track.id) {
                return Err(CatalogError::DuplicateId(track.id.clone()));
            }
        }
        Ok(Self { tracks })
    }

    /// Load a catalog from a JSON array of tracks
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let tracks: Vec<Track> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), tracks = tracks.len(), "catalog loaded");
        Self::from_tracks(tracks)
    }

    /// The built-in starter catalog
    pub fn seeded() -> Self {
        Self {
            tracks: vec![
                Track::new("1", "Inkem Inkem Inkem Kaavaale", "Sid Sriram")
                    .with_album("Geetha Govindam")
                    .with_moods([Mood::Romantic, Mood::FeelGood])
                    .with_cover("https://i.scdn.co/image/ab67616d0000b273bfa7630b81b19066e0f2b4a3")
                    .with_preview("https://cdn.pixabay.com/download/audio/2022/03/01/audio_1a2b.mp3?filename=romantic-preview.mp3"),
                Track::new("2", "Srivalli", "Javed Ali")
                    .with_album("Pushpa")
                    .with_moods([Mood::Melody, Mood::Romantic])
                    .with_cover("https://i.scdn.co/image/ab67616d0000b273a3f2b1b0a7ebf2e6e5132f2d"),
                Track::new("3", "Ramuloo Ramulaa", "Anurag Kulkarni")
                    .with_album("Ala Vaikunthapurramuloo")
                    .with_moods([Mood::Mass, Mood::Dance, Mood::FeelGood])
                    .with_cover("https://i.scdn.co/image/ab67616d0000b27342e6f4d2d5d4a1b2989d3d4a"),
                Track::new("4", "Samajavaragamana", "Sid Sriram")
                    .with_album("Ala Vaikunthapurramuloo")
                    .with_moods([Mood::Melody, Mood::FeelGood])
                    .with_cover("https://i.scdn.co/image/ab67616d0000b273f6f3a0e64ea6b2e0d69f3f93"),
            ],
        }
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// All songs in catalog order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Look up a song by ID
    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    /// Songs whose title, artist or any mood contains `query`
    ///
    /// Case-insensitive; the query is trimmed. An empty query matches
    /// everything.
    pub fn search(&self, query: &str) -> Vec<&Track> {
        let needle = query.trim().to_lowercase();
        self.tracks
            .iter()
            .filter(|track| matches(track, &needle))
            .collect()
    }

    /// First few matches for type-ahead; nothing for an empty query
    pub fn suggestions(&self, query: &str) -> Vec<&Track> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.tracks
            .iter()
            .filter(|track| matches(track, &needle))
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Home screen sections in display order
    pub fn sections(&self) -> Vec<Section<'_>> {
        SectionKind::ALL
            .into_iter()
            .map(|kind| Section {
                kind,
                tracks: self.tracks.iter().filter(|t| kind.admits(t)).collect(),
            })
            .collect()
    }
}

fn matches(track: &Track, needle: &str) -> bool {
    track.title.to_lowercase().contains(needle)
        || track.artist.to_lowercase().contains(needle)
        || track
            .moods
            .iter()
            .any(|mood| mood.as_str().to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.get(&"1".into()).is_some_and(Track::is_playable));
        assert!(catalog.get(&"2".into()).is_some_and(|t| !t.is_playable()));
    }

    #[test]
    fn search_is_case_insensitive_and_trimmed() {
        let catalog = Catalog::seeded();

        let titles: Vec<_> = catalog
            .search("  SID ")
            .into_iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Inkem Inkem Inkem Kaavaale", "Samajavaragamana"]);
    }

    #[test]
    fn search_matches_moods() {
        let catalog = Catalog::seeded();
        let ids: Vec<_> = catalog.search("mass").into_iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn empty_query_matches_all_but_suggests_nothing() {
        let catalog = Catalog::seeded();
        assert_eq!(catalog.search("   ").len(), 4);
        assert!(catalog.suggestions("").is_empty());
        assert!(catalog.suggestions("  ").is_empty());
    }

    #[test]
    fn suggestions_are_capped() {
        let tracks = (0..10)
            .map(|i| Track::new(i.to_string(), format!("Love Song {i}"), "Artist"))
            .collect();
        let catalog = Catalog::from_tracks(tracks).unwrap();

        assert_eq!(catalog.search("love").len(), 10);
        assert_eq!(catalog.suggestions("love").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn sections_follow_moods() {
        let catalog = Catalog::seeded();
        let sections = catalog.sections();

        let summary: Vec<_> = sections
            .iter()
            .map(|s| {
                let ids: Vec<_> = s.tracks.iter().map(|t| t.id.as_str()).collect();
                (s.kind.key(), ids)
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("feel-good", vec!["1", "3", "4"]),
                ("romantic", vec!["1", "2"]),
                ("mass", vec!["3"]),
                ("fresh", vec!["1", "2", "3", "4"]),
            ]
        );
        assert_eq!(sections[1].kind.title(), "Heart Touching Melodies");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::from_tracks(vec![
            Track::new("1", "A", "X"),
            Track::new("1", "B", "Y"),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id.as_str() == "1"));
    }
}
