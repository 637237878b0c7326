use crate::extractor::models::{RawFormats, VideoReference};
use crate::extractor::traits::UpstreamProvider;
use crate::utils::error::{ProviderError, TubeloaderError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Successful answer from one endpoint
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Id of the provider that answered
    pub provider: String,
    pub formats: RawFormats,
}

/// The Fallback Fetcher
///
/// Holds an ordered list of interchangeable upstream providers and asks them
/// one after another until one answers. Every provider gets exactly one
/// attempt per call, bounded by `attempt_timeout`.
pub struct FallbackFetcher {
    providers: Vec<Arc<dyn UpstreamProvider>>,
    attempt_timeout: Duration,
}

impl FallbackFetcher {
    /// Create a fetcher over `providers`, tried in the given order
    pub fn new(
        providers: Vec<Arc<dyn UpstreamProvider>>,
        attempt_timeout: Duration,
    ) -> Result<Self, TubeloaderError> {
        if providers.is_empty() {
            return Err(TubeloaderError::Config(
                "at least one upstream endpoint is required".to_string(),
            ));
        }
        if attempt_timeout.is_zero() {
            return Err(TubeloaderError::Config(
                "attempt timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            providers,
            attempt_timeout,
        })
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(|p| p.id())
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Try each provider in order and return the first success
    pub async fn fetch_first_success(&self, video: &VideoReference) -> Result<Fetched, TubeloaderError> {
        let mut last_error = None;

        for (attempt, provider) in self.providers.iter().enumerate() {
            debug!(
                "Attempt {}/{}: asking {} ({}) for {}",
                attempt + 1,
                self.providers.len(),
                provider.id(),
                provider.kind(),
                video.id
            );

            // On timeout the request future is dropped here, which aborts it
            let outcome = match tokio::time::timeout(self.attempt_timeout, provider.fetch_formats(video)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout {
                    endpoint: provider.id().to_string(),
                    after: self.attempt_timeout,
                }),
            };

            match outcome {
                Ok(formats) => {
                    info!(
                        "{} answered for {} with {} formats",
                        provider.id(),
                        video.id,
                        formats.entries.len()
                    );
                    return Ok(Fetched {
                        provider: provider.id().to_string(),
                        formats,
                    });
                }
                Err(e) => {
                    warn!("Endpoint {} failed: {}. Moving on...", provider.id(), e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(last) => Err(TubeloaderError::AllEndpointsExhausted {
                attempts: self.providers.len(),
                last,
            }),
            // `new` rejects an empty provider list
            None => Err(TubeloaderError::Config("no upstream endpoints configured".to_string())),
        }
    }
}
