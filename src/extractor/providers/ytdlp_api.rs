//! Generic HTTP services that return yt-dlp's info JSON

use super::{endpoint_id, lenient_u64, normalize_base, send_json};
use crate::extractor::models::{RawFormat, RawFormats, RawResolution, VideoDetails, VideoReference};
use crate::extractor::traits::{ProviderKind, UpstreamProvider};
use crate::utils::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Default request shape: `{base}/api/info?url=<encoded watch URL>`
pub const DEFAULT_TEMPLATE: &str = "{base}/api/info?url={url}";

/// Some services wrap the info document in `{"info": {...}}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum YtdlpBody {
    Wrapped {
        info: YtdlpInfo,
        error: Option<String>,
    },
    Bare(YtdlpInfo),
}

#[derive(Debug, Deserialize)]
pub(crate) struct YtdlpInfo {
    title: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    #[serde(default)]
    formats: Vec<YtdlpFormat>,
    /// Single-format extractions put the media URL at the top level
    url: Option<String>,
    ext: Option<String>,
    height: Option<i64>,
    /// Failure message; yt-dlp style wrappers answer 200 with this set
    error: Option<String>,
    /// FastAPI error body: a string or a list of validation errors
    detail: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct YtdlpFormat {
    url: Option<String>,
    ext: Option<String>,
    height: Option<i64>,
    format_note: Option<String>,
    resolution: Option<String>,
    fps: Option<f32>,
    vcodec: Option<String>,
    acodec: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    filesize: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    filesize_approx: Option<u64>,
}

fn codec_present(codec: &Option<String>) -> bool {
    codec.as_deref().map_or(false, |c| !c.is_empty() && c != "none")
}

impl YtdlpFormat {
    fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
    }

    fn into_raw(self) -> RawFormat {
        let resolution = match self.height {
            Some(h) => RawResolution::Pixels(h),
            None => self
                .format_note
                .clone()
                .or(self.resolution.clone())
                .map_or(RawResolution::Unknown, RawResolution::Label),
        };

        RawFormat {
            resolution,
            container: self.ext,
            has_audio: codec_present(&self.acodec),
            codec: self.vcodec.filter(|c| c != "none"),
            file_size: self.filesize.or(self.filesize_approx),
            fps: self.fps,
            url: self.url.unwrap_or_default(),
        }
    }
}

/// Convert a yt-dlp info document into raw formats
pub(crate) fn parse_info(endpoint: &str, body: YtdlpBody) -> Result<RawFormats, ProviderError> {
    let (info, outer_error) = match body {
        YtdlpBody::Wrapped { info, error } => (info, error),
        YtdlpBody::Bare(info) => (info, None),
    };

    let detail = info.detail.as_ref().map(|detail| match detail {
        serde_json::Value::String(message) => message.clone(),
        other => other.to_string(),
    });
    if let Some(message) = outer_error.or(info.error.clone()).or(detail) {
        return Err(ProviderError::Upstream {
            endpoint: endpoint.to_string(),
            message,
        });
    }

    let mut entries: Vec<RawFormat> = info
        .formats
        .into_iter()
        .filter(|f| !f.is_audio_only())
        .map(YtdlpFormat::into_raw)
        .collect();

    if entries.is_empty() {
        if let Some(url) = info.url {
            entries.push(RawFormat {
                resolution: RawResolution::from(info.height),
                container: info.ext,
                codec: None,
                has_audio: true,
                file_size: None,
                fps: None,
                url,
            });
        }
    }

    Ok(RawFormats {
        details: VideoDetails {
            title: info.title,
            author: info.uploader,
            duration_secs: info.duration.filter(|d| *d >= 0.0).map(|d| d.round() as u64),
            thumbnail: info.thumbnail,
        },
        entries,
    })
}

/// Fill `{base}`, `{id}` and `{url}` (percent-encoded watch URL) into a template
pub(crate) fn render_template(template: &str, base_url: &str, video: &VideoReference) -> String {
    let watch_url = video.id.watch_url();
    template
        .replace("{base}", base_url)
        .replace("{id}", video.id.as_str())
        .replace("{url}", &urlencoding::encode(&watch_url))
}

pub struct YtdlpApiProvider {
    id: String,
    base_url: String,
    template: String,
    client: Client,
}

impl YtdlpApiProvider {
    pub fn new(base_url: &str, client: Client, template: &str) -> Self {
        let base_url = normalize_base(base_url);
        Self {
            id: endpoint_id(ProviderKind::Ytdlp, &base_url),
            base_url,
            template: template.to_string(),
            client,
        }
    }
}

#[async_trait]
impl UpstreamProvider for YtdlpApiProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Ytdlp
    }

    async fn fetch_formats(&self, video: &VideoReference) -> Result<RawFormats, ProviderError> {
        let url = render_template(&self.template, &self.base_url, video);
        debug!("GET {}", url);

        let body: YtdlpBody = send_json(&self.id, self.client.get(&url)).await?;
        parse_info(&self.id, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::catalog::build_catalog;
    use crate::extractor::models::VideoId;

    const SAMPLE: &str = r#"{
        "id": "dQw4w9WgXcQ",
        "title": "Never Gonna Give You Up",
        "uploader": "Rick Astley",
        "duration": 212.4,
        "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
        "formats": [
            {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
             "url": "https://rr.example/140", "filesize": 3400000},
            {"format_id": "18", "ext": "mp4", "height": 360, "vcodec": "avc1.42001E",
             "acodec": "mp4a.40.2", "url": "https://rr.example/18", "fps": 25},
            {"format_id": "137", "ext": "mp4", "height": 1080, "vcodec": "avc1.640028",
             "acodec": "none", "url": "https://rr.example/137", "filesize_approx": 80000000.0},
            {"format_id": "sb0", "ext": "mhtml", "format_note": "storyboard", "vcodec": "none",
             "acodec": "none", "url": "https://rr.example/sb"}
        ]
    }"#;

    #[test]
    fn test_parse_sample_document() {
        let body: YtdlpBody = serde_json::from_str(SAMPLE).unwrap();
        let formats = parse_info("ytdlp@test", body).unwrap();

        assert_eq!(formats.details.author.as_deref(), Some("Rick Astley"));
        assert_eq!(formats.details.duration_secs, Some(212));
        assert_eq!(formats.entries.len(), 2);
        assert!(formats.entries[0].has_audio);
        assert!(!formats.entries[1].has_audio);
        assert_eq!(formats.entries[1].file_size, Some(80_000_000));

        let catalog = build_catalog(&formats.entries).unwrap();
        assert_eq!(catalog.best().unwrap().resolution, 1080);
        assert_eq!(catalog.best().unwrap().codec.as_deref(), Some("avc1.640028"));
    }

    #[test]
    fn test_wrapped_single_url_document() {
        let body: YtdlpBody = serde_json::from_str(
            r#"{"info": {"title": "t", "url": "https://rr.example/best", "ext": "webm", "height": 720}}"#,
        )
        .unwrap();
        let formats = parse_info("ytdlp@test", body).unwrap();

        assert_eq!(formats.details.title.as_deref(), Some("t"));
        assert_eq!(formats.entries.len(), 1);
        assert_eq!(formats.entries[0].resolution, RawResolution::Pixels(720));
        assert_eq!(formats.entries[0].container.as_deref(), Some("webm"));
    }

    #[test]
    fn test_label_fallback_when_height_missing() {
        let body: YtdlpBody = serde_json::from_str(
            r#"{"formats": [{"url": "u", "ext": "mp4", "format_note": "480p", "vcodec": "avc1", "acodec": "mp4a"}]}"#,
        )
        .unwrap();
        let formats = parse_info("ytdlp@test", body).unwrap();
        assert_eq!(formats.entries[0].resolution.to_pixels(), Some(480));
    }

    #[test]
    fn test_error_body_is_upstream_failure() {
        let parse = |json: &str| parse_info("ytdlp@test", serde_json::from_str(json).unwrap());

        match parse(r#"{"error": "ERROR: Unsupported URL"}"#) {
            Err(ProviderError::Upstream { endpoint, message }) => {
                assert_eq!(endpoint, "ytdlp@test");
                assert_eq!(message, "ERROR: Unsupported URL");
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
        assert!(matches!(
            parse(r#"{"info": {}, "error": "Video unavailable"}"#),
            Err(ProviderError::Upstream { ref message, .. }) if message == "Video unavailable"
        ));
        assert!(matches!(
            parse(r#"{"detail": "Not Found"}"#),
            Err(ProviderError::Upstream { ref message, .. }) if message == "Not Found"
        ));
        assert!(matches!(
            parse(r#"{"detail": [{"loc": ["query", "url"], "msg": "field required"}]}"#),
            Err(ProviderError::Upstream { ref message, .. }) if message.contains("field required")
        ));
    }

    #[test]
    fn test_render_template() {
        let video = VideoReference {
            id: VideoId::parse("dQw4w9WgXcQ").unwrap(),
            source_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
        };
        assert_eq!(
            render_template(DEFAULT_TEMPLATE, "https://api.example", &video),
            "https://api.example/api/info?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3DdQw4w9WgXcQ"
        );
        assert_eq!(
            render_template("{base}/v/{id}.json", "https://api.example", &video),
            "https://api.example/v/dQw4w9WgXcQ.json"
        );
    }
}
