//! Piped API (`/streams/{id}`)

use super::{codec_from_mime, container_from_mime, endpoint_id, lenient_u64, normalize_base, send_json};
use crate::extractor::models::{RawFormat, RawFormats, RawResolution, VideoDetails, VideoReference};
use crate::extractor::traits::{ProviderKind, UpstreamProvider};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PipedStreams {
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<i64>,
    thumbnail_url: Option<String>,
    #[serde(default)]
    video_streams: Vec<PipedStream>,
    error: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedStream {
    url: Option<String>,
    /// "MPEG_4", "WEBM", "v3GPP"
    format: Option<String>,
    /// "1080p", "720p60"
    quality: Option<String>,
    mime_type: Option<String>,
    codec: Option<String>,
    #[serde(default)]
    video_only: bool,
    fps: Option<f32>,
    height: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    content_length: Option<u64>,
}

fn container_from_format(format: &str) -> Option<String> {
    match format {
        "MPEG_4" => Some("mp4".to_string()),
        "WEBM" => Some("webm".to_string()),
        "v3GPP" => Some("3gp".to_string()),
        _ => None,
    }
}

impl PipedStream {
    fn into_raw(self) -> RawFormat {
        let resolution = match self.height {
            Some(h) if h > 0 => RawResolution::Pixels(h),
            _ => self.quality.map_or(RawResolution::Unknown, RawResolution::Label),
        };
        let mime = self.mime_type.unwrap_or_default();

        RawFormat {
            resolution,
            container: container_from_mime(&mime)
                .or_else(|| self.format.as_deref().and_then(container_from_format)),
            codec: self.codec.or_else(|| codec_from_mime(&mime)),
            has_audio: !self.video_only,
            // Piped reports -1 for unknown lengths, which lenient_u64 drops
            file_size: self.content_length.filter(|len| *len > 0),
            fps: self.fps,
            url: self.url.unwrap_or_default(),
        }
    }
}

/// Convert a Piped streams document into raw formats
pub(crate) fn parse_streams(endpoint: &str, streams: PipedStreams) -> Result<RawFormats, ProviderError> {
    if let Some(error) = streams.error {
        return Err(ProviderError::Upstream {
            endpoint: endpoint.to_string(),
            message: streams.message.unwrap_or(error),
        });
    }

    Ok(RawFormats {
        details: VideoDetails {
            title: streams.title,
            author: streams.uploader,
            duration_secs: streams.duration.and_then(|d| u64::try_from(d).ok()),
            thumbnail: streams.thumbnail_url,
        },
        entries: streams.video_streams.into_iter().map(PipedStream::into_raw).collect(),
    })
}

pub struct PipedProvider {
    id: String,
    base_url: String,
    client: Client,
}

impl PipedProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        let base_url = normalize_base(base_url);
        Self {
            id: endpoint_id(ProviderKind::Piped, &base_url),
            base_url,
            client,
        }
    }
}

#[async_trait]
impl UpstreamProvider for PipedProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Piped
    }

    async fn fetch_formats(&self, video: &VideoReference) -> Result<RawFormats, ProviderError> {
        let url = format!("{}/streams/{}", self.base_url, video.id);
        debug!("GET {}", url);

        let streams: PipedStreams = send_json(&self.id, self.client.get(&url)).await?;
        parse_streams(&self.id, streams)
    }
}
