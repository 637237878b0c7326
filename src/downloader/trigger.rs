//! Hand-off of a selected format to the system opener
//!
//! The transfer itself belongs to the browser. Nothing here polls, tracks
//! progress or resumes.

use crate::extractor::models::FormatDescriptor;
use crate::utils::error::TubeloaderError;
use tracing::info;

/// Something that can open a URL (browser, test double, ...)
pub trait Launcher {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with the system default handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn open(&self, url: &str) -> std::io::Result<()> {
        open::that(url)
    }
}

/// "Open this URL so the browser downloads it"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAction {
    pub url: String,
}

impl DownloadAction {
    /// Action for the user's current selection
    pub fn for_format(selected: &FormatDescriptor) -> Self {
        Self {
            url: selected.url.clone(),
        }
    }

    /// Action for an arbitrary URL, e.g. an external redirect page
    pub fn for_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Open the URL exactly once; no response is awaited
    pub fn execute(&self, launcher: &dyn Launcher) -> Result<(), TubeloaderError> {
        info!("Opening {}", self.url);
        launcher
            .open(&self.url)
            .map_err(|e| TubeloaderError::Launch(format!("{}: {}", self.url, e)))
    }
}
