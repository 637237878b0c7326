//! Format catalog building
//!
//! Turns the heterogeneous format lists returned by upstream services into
//! one ranked list of selectable downloads:
//! - one entry per resolution, highest first
//! - entries carrying audio beat video-only entries at the same resolution
//! - file size and frame rate are display data and never affect ranking

use crate::extractor::models::{FormatDescriptor, RawFormat};
use crate::utils::error::TubeloaderError;
use serde::Serialize;

/// Deduplicated formats for one video, sorted by descending resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormatCatalog {
    formats: Vec<FormatDescriptor>,
}

impl FormatCatalog {
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormatDescriptor> {
        self.formats.iter()
    }

    /// Highest resolution entry
    pub fn best(&self) -> Option<&FormatDescriptor> {
        self.formats.first()
    }

    /// Entry at exactly this resolution
    pub fn get(&self, resolution: u32) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.resolution == resolution)
    }

    /// Highest entry not above `max_resolution`
    pub fn closest_at_most(&self, max_resolution: u32) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.resolution <= max_resolution)
    }
}

impl<'a> IntoIterator for &'a FormatCatalog {
    type Item = &'a FormatDescriptor;
    type IntoIter = std::slice::Iter<'a, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.formats.iter()
    }
}

/// Normalize one upstream entry; `None` when it has no usable resolution or URL
fn to_descriptor(raw: &RawFormat) -> Option<FormatDescriptor> {
    let resolution = raw.resolution.to_pixels()?;
    if raw.url.trim().is_empty() {
        return None;
    }

    Some(FormatDescriptor {
        resolution,
        container: raw
            .container
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "unknown".to_string()),
        codec: raw.codec.clone().filter(|c| !c.is_empty()),
        has_audio: raw.has_audio,
        file_size: raw.file_size,
        fps: raw.fps,
        url: raw.url.clone(),
    })
}

/// Build the catalog from raw upstream entries
pub fn build_catalog(raw: &[RawFormat]) -> Result<FormatCatalog, TubeloaderError> {
    let mut formats: Vec<FormatDescriptor> = raw.iter().filter_map(to_descriptor).collect();

    // Stable sort: equal entries keep upstream order, which keeps this idempotent
    formats.sort_by(|a, b| {
        b.resolution
            .cmp(&a.resolution)
            .then_with(|| b.has_audio.cmp(&a.has_audio))
    });

    // Audio-bearing entries sort first within a resolution, so the first one wins
    formats.dedup_by_key(|f| f.resolution);

    if formats.is_empty() {
        return Err(TubeloaderError::NoDownloadableFormats);
    }

    Ok(FormatCatalog { formats })
}
