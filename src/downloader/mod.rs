//! Download hand-off

pub mod trigger;

// Re-export for convenience
pub use trigger::{DownloadAction, Launcher, SystemLauncher};
