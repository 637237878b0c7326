//! Error handling for Tubeloader

use std::time::Duration;
use thiserror::Error;

/// Main error type for Tubeloader
#[derive(Debug, Error)]
pub enum TubeloaderError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("All {attempts} endpoints failed, last error: {last}")]
    AllEndpointsExhausted { attempts: usize, last: ProviderError },

    #[error("No downloadable formats found")]
    NoDownloadableFormats,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open download URL: {0}")]
    Launch(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single attempt against one upstream endpoint
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{endpoint} timed out after {}s", .after.as_secs_f32())]
    Timeout { endpoint: String, after: Duration },

    #[error("{endpoint} returned HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("{endpoint} request failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} sent an unreadable response: {message}")]
    Parse { endpoint: String, message: String },

    #[error("{endpoint} reported an error: {message}")]
    Upstream { endpoint: String, message: String },
}

impl ProviderError {
    /// Endpoint the failed attempt was made against
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Timeout { endpoint, .. }
            | Self::HttpStatus { endpoint, .. }
            | Self::Network { endpoint, .. }
            | Self::Parse { endpoint, .. }
            | Self::Upstream { endpoint, .. } => endpoint,
        }
    }

    /// Classify a reqwest error raised while talking to `endpoint`
    pub fn from_reqwest(endpoint: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            };
        }
        if err.is_decode() {
            return Self::Parse {
                endpoint: endpoint.to_string(),
                message: err.to_string(),
            };
        }
        Self::Network {
            endpoint: endpoint.to_string(),
            source: err,
        }
    }
}
