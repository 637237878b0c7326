use crate::extractor::models::{RawFormats, VideoReference};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream service families a provider can speak to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Invidious,
    Piped,
    Cobalt,
    /// Any HTTP service returning yt-dlp's `--dump-json` shape
    Ytdlp,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invidious => write!(f, "invidious"),
            Self::Piped => write!(f, "piped"),
            Self::Cobalt => write!(f, "cobalt"),
            Self::Ytdlp => write!(f, "ytdlp"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invidious" => Ok(Self::Invidious),
            "piped" => Ok(Self::Piped),
            "cobalt" => Ok(Self::Cobalt),
            "ytdlp" | "yt-dlp" => Ok(Self::Ytdlp),
            other => Err(format!(
                "unknown provider '{}' (expected invidious, piped, cobalt or ytdlp)",
                other
            )),
        }
    }
}

/// Core trait for all upstream metadata services
///
/// Each implementation is bound to a single endpoint (one instance of one
/// service). The fallback fetcher treats them interchangeably.
#[async_trait]
pub trait UpstreamProvider: Send + Sync {
    /// Identifier used in logs and errors, e.g. "invidious@https://yewtu.be"
    fn id(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// Fetch the raw format list for a video. Makes exactly one logical
    /// request; retries are the caller's business.
    async fn fetch_formats(&self, video: &VideoReference) -> Result<RawFormats, ProviderError>;
}
