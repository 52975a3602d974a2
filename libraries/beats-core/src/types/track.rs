/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mood tag attached to catalog songs
///
/// Known moods drive the curated sections; anything else is kept verbatim so
/// catalogs can carry their own tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Mood {
    /// "feel-good"
    FeelGood,
    /// "romantic"
    Romantic,
    /// "mass"
    Mass,
    /// "dance"
    Dance,
    /// "melody"
    Melody,
    /// "fresh"
    Fresh,
    /// Any other tag
    Other(String),
}

impl Mood {
    /// Canonical tag string
    pub fn as_str(&self) -> &str {
        match self {
            Mood::FeelGood => "feel-good",
            Mood::Romantic => "romantic",
            Mood::Mass => "mass",
            Mood::Dance => "dance",
            Mood::Melody => "melody",
            Mood::Fresh => "fresh",
            Mood::Other(tag) => tag,
        }
    }
}

impl From<String> for Mood {
    fn from(tag: String) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "feel-good" => Mood::FeelGood,
            "romantic" => Mood::Romantic,
            "mass" => Mood::Mass,
            "dance" => Mood::Dance,
            "melody" => Mood::Melody,
            "fresh" => Mood::Fresh,
            _ => Mood::Other(tag),
        }
    }
}

impl From<&str> for Mood {
    fn from(tag: &str) -> Self {
        Mood::from(tag.to_string())
    }
}

impl From<Mood> for String {
    fn from(mood: Mood) -> Self {
        match mood {
            Mood::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A song that can be listed, favorited and previewed
///
/// Immutable once handed to the player. `preview_uri` may be missing or blank,
/// which marks the song as "not playable".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    #[serde(default)]
    pub album: Option<String>,

    /// Mood tags used by search and curated sections
    #[serde(default, alias = "mood")]
    pub moods: Vec<Mood>,

    /// Locator of a short preview clip
    #[serde(default, alias = "preview")]
    pub preview_uri: Option<String>,

    /// Cover art locator (display only)
    #[serde(default, alias = "cover")]
    pub cover_uri: Option<String>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            moods: Vec::new(),
            preview_uri: None,
            cover_uri: None,
        }
    }

    /// Set the album name
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Replace the mood tags
    pub fn with_moods<I, M>(mut self, moods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Mood>,
    {
        self.moods = moods.into_iter().map(Into::into).collect();
        self
    }

    /// Set the preview locator
    pub fn with_preview(mut self, uri: impl Into<String>) -> Self {
        self.preview_uri = Some(uri.into());
        self
    }

    /// Set the cover art locator
    pub fn with_cover(mut self, uri: impl Into<String>) -> Self {
        self.cover_uri = Some(uri.into());
        self
    }

    /// Preview locator, if present and non-blank
    pub fn preview(&self) -> Option<&str> {
        self.preview_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }

    /// Whether the track carries a usable preview locator
    pub fn is_playable(&self) -> bool {
        self.preview().is_some()
    }

    /// Whether the track is tagged with `mood`
    pub fn has_mood(&self, mood: &Mood) -> bool {
        self.moods.contains(mood)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_preview_is_not_playable() {
        let track = Track::new("2", "Srivalli", "Javed Ali");
        assert!(!track.is_playable());

        let track = track.with_preview("   ");
        assert!(!track.is_playable());
        assert_eq!(track.preview(), None);
    }

    #[test]
    fn preview_is_trimmed() {
        let track = Track::new("1", "Song", "Artist").with_preview(" https://a/b.mp3 ");
        assert_eq!(track.preview(), Some("https://a/b.mp3"));
    }

    #[test]
    fn deserializes_catalog_shape() {
        let json = r#"{
            "id": "1",
            "title": "Inkem Inkem Inkem Kaavaale",
            "artist": "Sid Sriram",
            "album": "Geetha Govindam",
            "mood": ["romantic", "feel-good", "monsoon"],
            "cover": "https://img/1.jpg",
            "preview": ""
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.id.as_str(), "1");
        assert_eq!(
            track.moods,
            vec![
                Mood::Romantic,
                Mood::FeelGood,
                Mood::Other("monsoon".to_string())
            ]
        );
        assert_eq!(track.cover_uri.as_deref(), Some("https://img/1.jpg"));
        assert!(!track.is_playable());
    }

    #[test]
    fn mood_round_trips_through_string() {
        let tag: String = Mood::FeelGood.into();
        assert_eq!(tag, "feel-good");
        assert_eq!(Mood::from("Feel-Good"), Mood::FeelGood);
    }
}
