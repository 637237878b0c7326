//! Data structures for video references and format descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub const LEN: usize = 11;

    /// Accepts only tokens of the exact YouTube id shape (`[A-Za-z0-9_-]{11}`)
    pub fn parse(token: &str) -> Option<Self> {
        let well_formed = token.len() == Self::LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page URL for this id
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resolved video id together with the URL the user supplied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoReference {
    pub id: VideoId,
    pub source_url: String,
}

/// Display-only metadata returned alongside the format list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub title: Option<String>,
    pub author: Option<String>,
    pub duration_secs: Option<u64>,
    pub thumbnail: Option<String>,
}

/// Vertical resolution as reported by an upstream service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResolution {
    /// Integer height in pixels
    Pixels(i64),
    /// Label such as "1080p", "720p60", "hd720" or "1920x1080"
    Label(String),
    Unknown,
}

impl RawResolution {
    /// Coerce to pixels of height. Non-positive or unparseable values yield `None`.
    pub fn to_pixels(&self) -> Option<u32> {
        let height = match self {
            Self::Pixels(n) => u32::try_from(*n).ok()?,
            Self::Label(label) => parse_resolution_label(label)?,
            Self::Unknown => return None,
        };
        (height > 0).then_some(height)
    }
}

impl From<Option<i64>> for RawResolution {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Unknown, Self::Pixels)
    }
}

fn parse_resolution_label(label: &str) -> Option<u32> {
    let label = label.trim().to_ascii_lowercase();

    // "1920x1080"
    if let Some((w, h)) = label.split_once('x') {
        if !w.is_empty() && w.bytes().all(|b| b.is_ascii_digit()) {
            let h: String = h.chars().take_while(|c| c.is_ascii_digit()).collect();
            return h.parse().ok();
        }
    }

    match label.as_str() {
        "4k" => return Some(2160),
        "8k" => return Some(4320),
        _ => {}
    }

    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// One upstream format entry before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawFormat {
    pub resolution: RawResolution,
    pub container: Option<String>,
    pub codec: Option<String>,
    pub has_audio: bool,
    pub file_size: Option<u64>,
    pub fps: Option<f32>,
    pub url: String,
}

/// Everything a provider returns for one video
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFormats {
    pub details: VideoDetails,
    pub entries: Vec<RawFormat>,
}

/// One downloadable rendition of a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Pixels of vertical resolution, always > 0
    pub resolution: u32,
    /// Container hint (mp4, webm, ...)
    pub container: String,
    pub codec: Option<String>,
    pub has_audio: bool,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub fps: Option<f32>,
    pub url: String,
}

impl FormatDescriptor {
    /// Short quality label, e.g. "1080p" or "1080p60"
    pub fn quality_label(&self) -> String {
        match self.fps {
            Some(fps) if fps > 30.0 => format!("{}p{}", self.resolution, fps.round() as u32),
            _ => format!("{}p", self.resolution),
        }
    }

    /// One-line summary for listings
    pub fn display_label(&self) -> String {
        let mut label = format!("{:<8} {:<5}", self.quality_label(), self.container);
        if let Some(codec) = &self.codec {
            label.push_str(&format!(" {:<6}", short_codec(codec)));
        }
        label.push_str(if self.has_audio { " audio" } else { " video-only" });
        if let Some(size) = format_size(self.file_size) {
            label.push_str(&format!("  {}", size));
        }
        label
    }
}

/// Strip codec profile suffixes: "avc1.4d401f" -> "avc1"
fn short_codec(codec: &str) -> &str {
    codec.split('.').next().unwrap_or(codec)
}

/// Format file size for display
pub fn format_size(bytes: Option<u64>) -> Option<String> {
    bytes.map(|b| {
        let mb = b as f64 / 1_048_576.0;
        if mb >= 1024.0 {
            format!("{:.1} GB", mb / 1024.0)
        } else {
            format!("{:.1} MB", mb)
        }
    })
}
