//! Catalog domain models
//!
//! Mirrors the bundled manifest: a named category holding the videos shown on
//! the list screen.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level manifest document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub name: String,
    pub videos: Vec<Video>,
}

/// A single catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub description: String,
    pub sources: Vec<String>,
    pub subtitle: Subtitle,
    pub thumb: String,
    pub title: String,
}

impl Video {
    /// The playable source: the first entry of `sources`.
    pub fn source(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }
}

/// Attribution line shown under each video.
///
/// Closed set; unknown attributions fail decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subtitle {
    #[serde(rename = "By Blender Foundation")]
    ByBlenderFoundation,
    #[serde(rename = "By Garage419")]
    ByGarage419,
    #[serde(rename = "By Google")]
    ByGoogle,
}

impl Subtitle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtitle::ByBlenderFoundation => "By Blender Foundation",
            Subtitle::ByGarage419 => "By Garage419",
            Subtitle::ByGoogle => "By Google",
        }
    }
}

impl fmt::Display for Subtitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtitle_wire_values() {
        let decoded: Subtitle = serde_json::from_str("\"By Garage419\"").unwrap();
        assert_eq!(decoded, Subtitle::ByGarage419);
        assert_eq!(Subtitle::ByGoogle.to_string(), "By Google");
    }

    #[test]
    fn test_unknown_subtitle_fails() {
        let result: Result<Subtitle, _> = serde_json::from_str("\"By Pixar\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_video_uses_first_source() {
        let video = Video {
            description: String::new(),
            sources: vec!["http://a/1.mp4".into(), "http://a/2.mp4".into()],
            subtitle: Subtitle::ByGoogle,
            thumb: "images/a.jpg".into(),
            title: "A".into(),
        };
        assert_eq!(video.source(), Some("http://a/1.mp4"));

        let empty = Video {
            sources: Vec::new(),
            ..video
        };
        assert_eq!(empty.source(), None);
    }
}
