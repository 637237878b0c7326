//! Cobalt API (`POST /`)
//!
//! Cobalt does not list formats. It is asked for one quality and answers
//! with a single muxed media URL, or a picker of several items that is
//! resolved here into one entry per video item.

use super::{decode_json, endpoint_id, normalize_base};
use crate::extractor::models::{RawFormat, RawFormats, RawResolution, VideoDetails, VideoReference};
use crate::extractor::traits::{ProviderKind, UpstreamProvider};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Heights Cobalt accepts as `videoQuality`
pub const SUPPORTED_QUALITIES: [u32; 9] = [144, 240, 360, 480, 720, 1080, 1440, 2160, 4320];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CobaltRequest<'a> {
    url: &'a str,
    video_quality: String,
    download_mode: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CobaltResponse {
    status: String,
    url: Option<String>,
    filename: Option<String>,
    #[serde(default)]
    picker: Vec<CobaltPickerItem>,
    error: Option<CobaltErrorBody>,
}

#[derive(Debug, Deserialize)]
struct CobaltPickerItem {
    #[serde(rename = "type")]
    kind: Option<String>,
    url: String,
    thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CobaltErrorBody {
    code: Option<String>,
}

/// Extension of a file name: "clip (1080p, h264).mp4" -> "mp4"
fn container_from_filename(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    (!ext.is_empty() && ext.len() <= 5).then(|| ext.to_ascii_lowercase())
}

/// Convert a Cobalt answer into raw formats at the requested quality
pub(crate) fn parse_response(
    endpoint: &str,
    quality: u32,
    response: CobaltResponse,
) -> Result<RawFormats, ProviderError> {
    let resolution = RawResolution::Pixels(quality as i64);
    let container = response.filename.as_deref().and_then(container_from_filename);
    let title = response
        .filename
        .as_deref()
        .and_then(|f| f.rsplit_once('.').map(|(stem, _)| stem.to_string()));

    let entry = |url: String| RawFormat {
        resolution: resolution.clone(),
        container: container.clone(),
        codec: None,
        has_audio: true,
        file_size: None,
        fps: None,
        url,
    };

    let (entries, thumbnail) = match response.status.as_str() {
        "tunnel" | "redirect" | "stream" => {
            let url = response.url.ok_or_else(|| ProviderError::Parse {
                endpoint: endpoint.to_string(),
                message: format!("status '{}' without url", response.status),
            })?;
            (vec![entry(url)], None)
        }
        "picker" => {
            let thumbnail = response.picker.iter().find_map(|item| item.thumb.clone());
            let entries = response
                .picker
                .into_iter()
                .filter(|item| item.kind.as_deref().map_or(true, |k| k == "video"))
                .map(|item| entry(item.url))
                .collect();
            (entries, thumbnail)
        }
        "error" => {
            let code = response
                .error
                .and_then(|e| e.code)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(ProviderError::Upstream {
                endpoint: endpoint.to_string(),
                message: code,
            });
        }
        other => {
            return Err(ProviderError::Parse {
                endpoint: endpoint.to_string(),
                message: format!("unexpected status '{}'", other),
            })
        }
    };

    Ok(RawFormats {
        details: VideoDetails {
            title,
            thumbnail,
            ..Default::default()
        },
        entries,
    })
}

pub struct CobaltProvider {
    id: String,
    base_url: String,
    client: Client,
    quality: u32,
}

impl CobaltProvider {
    pub fn new(base_url: &str, client: Client, quality: u32) -> Self {
        let base_url = normalize_base(base_url);
        Self {
            id: endpoint_id(ProviderKind::Cobalt, &base_url),
            base_url,
            client,
            quality,
        }
    }
}

#[async_trait]
impl UpstreamProvider for CobaltProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Cobalt
    }

    async fn fetch_formats(&self, video: &VideoReference) -> Result<RawFormats, ProviderError> {
        let watch_url = video.id.watch_url();
        let body = CobaltRequest {
            url: &watch_url,
            video_quality: self.quality.to_string(),
            download_mode: "auto",
        };
        debug!("POST {}/ for {}", self.base_url, video.id);

        let response = self
            .client
            .post(format!("{}/", self.base_url))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.id, e))?;

        // Cobalt explains failures in a JSON body on 4xx, so read it before
        // giving up on the status code
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(&self.id, e))?;

        match decode_json::<CobaltResponse>(&self.id, &bytes) {
            Ok(parsed) if status.is_success() || parsed.status == "error" => {
                parse_response(&self.id, self.quality, parsed)
            }
            Ok(_) => Err(ProviderError::HttpStatus {
                endpoint: self.id.clone(),
                status: status.as_u16(),
            }),
            Err(_) if !status.is_success() => Err(ProviderError::HttpStatus {
                endpoint: self.id.clone(),
                status: status.as_u16(),
            }),
            Err(e) => Err(e),
        }
    }
}
