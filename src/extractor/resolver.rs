//! Video id extraction from user-supplied URLs

use crate::extractor::models::{VideoId, VideoReference};
use crate::utils::error::TubeloaderError;
use regex::Regex;
use std::sync::LazyLock;

/// URL shapes tried in order; each captures the 11-character id in group 1.
/// The trailing class guard rejects ids longer than 11 characters.
static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // youtube.com/watch?v=ID (v anywhere in the query)
        r"(?:^|[/.])youtube\.com/watch/?\?(?:[^#]*&)?v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        // youtu.be/ID
        r"(?:^|[/.])youtu\.be/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        // youtube.com/embed/ID, youtube-nocookie.com/embed/ID, youtube.com/v/ID
        r"(?:^|[/.])youtube(?:-nocookie)?\.com/(?:embed|v)/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        // youtube.com/shorts/ID
        r"(?:^|[/.])youtube\.com/shorts/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
        // youtube.com/live/ID
        r"(?:^|[/.])youtube\.com/live/([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("video id pattern is valid"))
    .collect()
});

/// Extract the video id from a YouTube URL.
///
/// Only the syntactic shape is checked; whether the video exists is up to
/// the upstream service.
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();
    VIDEO_ID_PATTERNS.iter().find_map(|re| {
        re.captures(input)
            .and_then(|caps| caps.get(1))
            .and_then(|m| VideoId::parse(m.as_str()))
    })
}

/// Resolve user input into a [`VideoReference`]
pub fn resolve(input: &str) -> Result<VideoReference, TubeloaderError> {
    let id = extract_video_id(input)
        .ok_or_else(|| TubeloaderError::InvalidUrl(input.trim().to_string()))?;
    Ok(VideoReference {
        id,
        source_url: input.trim().to_string(),
    })
}
