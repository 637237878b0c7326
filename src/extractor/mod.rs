pub mod catalog;
pub mod fallback;
pub mod models;
pub mod providers;
pub mod resolver;
pub mod traits;

pub use catalog::{build_catalog, FormatCatalog};
pub use fallback::{FallbackFetcher, Fetched};
pub use models::{
    FormatDescriptor, RawFormat, RawFormats, RawResolution, VideoDetails, VideoId, VideoReference,
};
pub use providers::ProviderOptions;
pub use resolver::{extract_video_id, resolve};
pub use traits::{ProviderKind, UpstreamProvider};
