//! Utility modules for error handling, configuration and clipboard access

pub mod clipboard;
pub mod config;
pub mod error;

// Re-export for convenience
pub use config::{AppSettings, EndpointConfig};
pub use error::{ProviderError, TubeloaderError};
