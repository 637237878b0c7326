//! Lookup service: URL in, ranked format catalog out

use crate::extractor::catalog::{build_catalog, FormatCatalog};
use crate::extractor::fallback::FallbackFetcher;
use crate::extractor::models::{VideoDetails, VideoId, VideoReference};
use crate::extractor::providers::{build_client, build_provider};
use crate::extractor::resolver::resolve;
use crate::extractor::traits::UpstreamProvider;
use crate::utils::config::AppSettings;
use crate::utils::error::TubeloaderError;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Everything known about one video after a successful lookup
#[derive(Debug, Clone, Serialize)]
pub struct VideoListing {
    #[serde(skip)]
    pub reference: VideoReference,
    pub id: VideoId,
    pub details: VideoDetails,
    pub catalog: FormatCatalog,
    /// Endpoint that answered
    pub provider: String,
}

/// Outcome of [`Tubeloader::lookup`]
#[derive(Debug)]
pub enum Lookup {
    Listing(VideoListing),
    /// Every endpoint failed and an external redirect page is configured
    Redirect { url: String, cause: TubeloaderError },
}

/// Resolver, fallback fetcher and format aggregator wired together
pub struct Tubeloader {
    fetcher: FallbackFetcher,
    redirect_fallback: Option<String>,
}

impl Tubeloader {
    /// Build providers for every configured endpoint
    pub fn from_settings(settings: &AppSettings) -> Result<Self, TubeloaderError> {
        settings.validate()?;

        let client = build_client(&settings.user_agent)?;
        let options = settings.provider_options();
        let providers = settings
            .endpoints
            .iter()
            .map(|endpoint| build_provider(endpoint.kind, &endpoint.base_url, client.clone(), &options))
            .collect();

        Ok(Self {
            fetcher: FallbackFetcher::new(providers, settings.attempt_timeout())?,
            redirect_fallback: settings.redirect_fallback.clone(),
        })
    }

    /// Wire up custom providers directly
    pub fn with_providers(
        providers: Vec<Arc<dyn UpstreamProvider>>,
        attempt_timeout: Duration,
        redirect_fallback: Option<String>,
    ) -> Result<Self, TubeloaderError> {
        Ok(Self {
            fetcher: FallbackFetcher::new(providers, attempt_timeout)?,
            redirect_fallback,
        })
    }

    pub fn fetcher(&self) -> &FallbackFetcher {
        &self.fetcher
    }

    /// Resolve the URL, fetch formats and build the catalog
    pub async fn lookup(&self, input: &str) -> Result<Lookup, TubeloaderError> {
        let reference = resolve(input)?;
        info!("Looking up {} ({})", reference.id, reference.source_url);

        let fetched = match self.fetcher.fetch_first_success(&reference).await {
            Ok(fetched) => fetched,
            Err(cause @ TubeloaderError::AllEndpointsExhausted { .. }) => {
                return match &self.redirect_fallback {
                    Some(template) => {
                        let url = template.replace("{id}", reference.id.as_str());
                        warn!("{}. Falling back to external page {}", cause, url);
                        Ok(Lookup::Redirect { url, cause })
                    }
                    None => Err(cause),
                };
            }
            Err(e) => return Err(e),
        };

        let catalog = build_catalog(&fetched.formats.entries)?;
        info!(
            "{} formats available for {} via {}",
            catalog.len(),
            reference.id,
            fetched.provider
        );

        Ok(Lookup::Listing(VideoListing {
            id: reference.id.clone(),
            reference,
            details: fetched.formats.details,
            catalog,
            provider: fetched.provider,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::{RawFormat, RawFormats, RawResolution};
    use crate::extractor::traits::ProviderKind;
    use crate::utils::error::ProviderError;
    use async_trait::async_trait;

    struct StaticProvider {
        result: fn() -> Result<RawFormats, ProviderError>,
    }

    #[async_trait]
    impl UpstreamProvider for StaticProvider {
        fn id(&self) -> &str {
            "static"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Ytdlp
        }

        async fn fetch_formats(&self, _video: &VideoReference) -> Result<RawFormats, ProviderError> {
            (self.result)()
        }
    }

    fn service(result: fn() -> Result<RawFormats, ProviderError>, redirect: Option<&str>) -> Tubeloader {
        Tubeloader::with_providers(
            vec![Arc::new(StaticProvider { result })],
            Duration::from_secs(1),
            redirect.map(str::to_string),
        )
        .unwrap()
    }

    fn failing() -> Result<RawFormats, ProviderError> {
        Err(ProviderError::HttpStatus {
            endpoint: "static".to_string(),
            status: 503,
        })
    }

    fn audio_only() -> Result<RawFormats, ProviderError> {
        Ok(RawFormats {
            details: VideoDetails::default(),
            entries: vec![RawFormat {
                resolution: RawResolution::Unknown,
                container: Some("m4a".to_string()),
                codec: None,
                has_audio: true,
                file_size: None,
                fps: None,
                url: "https://cdn.example/a".to_string(),
            }],
        })
    }

    fn two_formats() -> Result<RawFormats, ProviderError> {
        let entry = |height: i64, url: &str| RawFormat {
            resolution: RawResolution::Pixels(height),
            container: Some("mp4".to_string()),
            codec: None,
            has_audio: true,
            file_size: None,
            fps: None,
            url: url.to_string(),
        };
        Ok(RawFormats {
            details: VideoDetails {
                title: Some("Title".to_string()),
                ..Default::default()
            },
            entries: vec![entry(360, "https://cdn.example/360"), entry(720, "https://cdn.example/720")],
        })
    }

    #[tokio::test]
    async fn test_lookup_returns_ranked_listing() {
        let lookup = service(two_formats, None)
            .lookup("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();

        match lookup {
            Lookup::Listing(listing) => {
                assert_eq!(listing.id.as_str(), "dQw4w9WgXcQ");
                assert_eq!(listing.provider, "static");
                assert_eq!(listing.details.title.as_deref(), Some("Title"));
                assert_eq!(listing.catalog.best().unwrap().url, "https://cdn.example/720");
            }
            other => panic!("expected listing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_is_never_redirected() {
        let result = service(two_formats, Some("https://redirect.example/{id}"))
            .lookup("not a url")
            .await;
        assert!(matches!(result, Err(TubeloaderError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_exhausted_without_redirect_is_error() {
        let result = service(failing, None).lookup("https://youtu.be/dQw4w9WgXcQ").await;
        assert!(matches!(result, Err(TubeloaderError::AllEndpointsExhausted { .. })));
    }

    #[tokio::test]
    async fn test_exhausted_with_redirect_is_visible_to_caller() {
        let result = service(failing, Some("https://redirect.example/watch?v={id}"))
            .lookup("https://youtu.be/dQw4w9WgXcQ")
            .await
            .unwrap();

        match result {
            Lookup::Redirect { url, cause } => {
                assert_eq!(url, "https://redirect.example/watch?v=dQw4w9WgXcQ");
                assert!(matches!(cause, TubeloaderError::AllEndpointsExhausted { attempts: 1, .. }));
            }
            other => panic!("expected redirect, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_formats_is_distinct_from_fetch_failure() {
        let result = service(audio_only, Some("https://redirect.example/{id}"))
            .lookup("https://youtu.be/dQw4w9WgXcQ")
            .await;
        assert!(matches!(result, Err(TubeloaderError::NoDownloadableFormats)));
    }

    #[test]
    fn test_from_settings_builds_every_endpoint() {
        let settings = AppSettings::default();
        let service = Tubeloader::from_settings(&settings).unwrap();
        assert_eq!(service.fetcher().providers().count(), settings.endpoints.len());
        assert_eq!(
            service.fetcher().providers().next(),
            Some("invidious@https://inv.nadeko.net")
        );
    }
}
