//! Upstream provider implementations
//!
//! One module per service family. Each provider is bound to a single
//! instance base URL and shares the HTTP client handed to it.

pub mod cobalt;
pub mod invidious;
pub mod piped;
pub mod ytdlp_api;

pub use cobalt::CobaltProvider;
pub use invidious::InvidiousProvider;
pub use piped::PipedProvider;
pub use ytdlp_api::YtdlpApiProvider;

use crate::extractor::traits::{ProviderKind, UpstreamProvider};
use crate::utils::error::{ProviderError, TubeloaderError};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::debug;

/// Per-kind knobs that don't belong to a single endpoint
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    /// Quality requested from Cobalt instances (pixels of height)
    pub cobalt_quality: u32,
    /// URL template for yt-dlp style APIs; `{base}`, `{id}` and `{url}` are substituted
    pub ytdlp_template: String,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self {
            cobalt_quality: 1080,
            ytdlp_template: ytdlp_api::DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Create the HTTP client shared by all providers
pub fn build_client(user_agent: &str) -> Result<Client, TubeloaderError> {
    Client::builder()
        .user_agent(user_agent)
        .build()
        .map_err(|e| TubeloaderError::Config(format!("failed to create HTTP client: {}", e)))
}

/// Instantiate the provider for one configured endpoint
pub fn build_provider(
    kind: ProviderKind,
    base_url: &str,
    client: Client,
    options: &ProviderOptions,
) -> Arc<dyn UpstreamProvider> {
    match kind {
        ProviderKind::Invidious => Arc::new(InvidiousProvider::new(base_url, client)),
        ProviderKind::Piped => Arc::new(PipedProvider::new(base_url, client)),
        ProviderKind::Cobalt => Arc::new(CobaltProvider::new(base_url, client, options.cobalt_quality)),
        ProviderKind::Ytdlp => Arc::new(YtdlpApiProvider::new(
            base_url,
            client,
            &options.ytdlp_template,
        )),
    }
}

pub(crate) fn endpoint_id(kind: ProviderKind, base_url: &str) -> String {
    format!("{}@{}", kind, base_url)
}

pub(crate) fn normalize_base(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// Send a request and decode a JSON body, mapping failures to `ProviderError`
pub(crate) async fn send_json<T: DeserializeOwned>(
    endpoint: &str,
    request: RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::from_reqwest(endpoint, e))?;

    let status = response.status();
    debug!("{} responded with {}", endpoint, status);
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ProviderError::from_reqwest(endpoint, e))?;
    decode_json(endpoint, &body)
}

pub(crate) fn decode_json<T: DeserializeOwned>(endpoint: &str, body: &[u8]) -> Result<T, ProviderError> {
    serde_json::from_slice(body).map_err(|e| ProviderError::Parse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

/// Resolve instance-relative media paths ("/videoplayback?...") against the base URL
pub(crate) fn absolutize(base_url: &str, url: &str) -> String {
    if url.starts_with('/') && !url.starts_with("//") {
        format!("{}{}", base_url, url)
    } else {
        url.to_string()
    }
}

/// Container from a MIME type: "video/mp4; codecs=..." -> "mp4"
pub(crate) fn container_from_mime(mime: &str) -> Option<String> {
    let essence = mime.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    (!subtype.is_empty()).then(|| subtype.to_string())
}

/// First codec from a MIME type: `video/mp4; codecs="avc1.4d401f, mp4a.40.2"` -> "avc1.4d401f"
pub(crate) fn codec_from_mime(mime: &str) -> Option<String> {
    let (_, params) = mime.split_once("codecs=")?;
    let first = params.trim_matches('"').split(',').next()?.trim().trim_matches('"');
    (!first.is_empty()).then(|| first.to_string())
}

/// Sizes and counts arrive as numbers, numeric strings or floats depending on the service
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64)),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
