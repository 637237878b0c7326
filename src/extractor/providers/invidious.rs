//! Invidious API (`/api/v1/videos/{id}`)

use super::{absolutize, codec_from_mime, container_from_mime, endpoint_id, lenient_u64, normalize_base, send_json};
use crate::extractor::models::{RawFormat, RawFormats, RawResolution, VideoDetails, VideoReference};
use crate::extractor::traits::{ProviderKind, UpstreamProvider};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InvidiousVideo {
    title: Option<String>,
    author: Option<String>,
    length_seconds: Option<u64>,
    #[serde(default)]
    video_thumbnails: Vec<InvidiousThumbnail>,
    /// Progressive streams, always audio+video
    #[serde(default)]
    format_streams: Vec<InvidiousStream>,
    /// DASH streams, video-only or audio-only
    #[serde(default)]
    adaptive_formats: Vec<InvidiousStream>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InvidiousThumbnail {
    quality: Option<String>,
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousStream {
    url: Option<String>,
    #[serde(rename = "type")]
    mime_type: Option<String>,
    container: Option<String>,
    encoding: Option<String>,
    resolution: Option<String>,
    quality_label: Option<String>,
    size: Option<String>,
    fps: Option<f32>,
    #[serde(default, deserialize_with = "lenient_u64")]
    clen: Option<u64>,
}

impl InvidiousStream {
    fn is_audio_only(&self) -> bool {
        self.mime_type
            .as_deref()
            .map_or(false, |m| m.starts_with("audio/"))
    }

    fn into_raw(self, base_url: &str, has_audio: bool) -> RawFormat {
        let resolution = self
            .resolution
            .or(self.quality_label)
            .or(self.size)
            .map_or(RawResolution::Unknown, RawResolution::Label);
        let mime = self.mime_type.unwrap_or_default();

        RawFormat {
            resolution,
            container: self.container.or_else(|| container_from_mime(&mime)),
            codec: codec_from_mime(&mime).or(self.encoding),
            has_audio,
            file_size: self.clen,
            fps: self.fps,
            url: self
                .url
                .map(|u| absolutize(base_url, &u))
                .unwrap_or_default(),
        }
    }
}

/// Convert an Invidious video document into raw formats
pub(crate) fn parse_video(endpoint: &str, base_url: &str, video: InvidiousVideo) -> Result<RawFormats, ProviderError> {
    if let Some(message) = video.error {
        return Err(ProviderError::Upstream {
            endpoint: endpoint.to_string(),
            message,
        });
    }

    let thumbnail = video
        .video_thumbnails
        .iter()
        .find(|t| t.quality.as_deref() == Some("high"))
        .or_else(|| video.video_thumbnails.first())
        .map(|t| absolutize(base_url, &t.url));

    let mut entries: Vec<RawFormat> = video
        .format_streams
        .into_iter()
        .map(|s| s.into_raw(base_url, true))
        .collect();
    entries.extend(
        video
            .adaptive_formats
            .into_iter()
            .filter(|s| !s.is_audio_only())
            .map(|s| s.into_raw(base_url, false)),
    );

    Ok(RawFormats {
        details: VideoDetails {
            title: video.title,
            author: video.author,
            duration_secs: video.length_seconds,
            thumbnail,
        },
        entries,
    })
}

pub struct InvidiousProvider {
    id: String,
    base_url: String,
    client: Client,
}

impl InvidiousProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        let base_url = normalize_base(base_url);
        Self {
            id: endpoint_id(ProviderKind::Invidious, &base_url),
            base_url,
            client,
        }
    }
}

#[async_trait]
impl UpstreamProvider for InvidiousProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Invidious
    }

    async fn fetch_formats(&self, video: &VideoReference) -> Result<RawFormats, ProviderError> {
        let url = format!("{}/api/v1/videos/{}", self.base_url, video.id);
        debug!("GET {}", url);

        let document: InvidiousVideo = send_json(&self.id, self.client.get(&url)).await?;
        parse_video(&self.id, &self.base_url, document)
    }
}
