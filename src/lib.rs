//! Tubeloader library

pub mod app;
pub mod downloader;
pub mod extractor;
pub mod utils;

// Re-export main types for easier use
pub use app::{Lookup, Tubeloader, VideoListing};
pub use downloader::{DownloadAction, Launcher, SystemLauncher};
pub use extractor::{FallbackFetcher, FormatCatalog, FormatDescriptor, ProviderKind, UpstreamProvider};
pub use utils::{AppSettings, EndpointConfig, ProviderError, TubeloaderError};
