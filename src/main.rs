//! Tubeloader - YouTube format lookup
//!
//! Resolves a video URL, asks a list of interchangeable upstream services for
//! its formats and hands the chosen stream URL to the browser.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{warn, Level};
use tubeloader::downloader::{DownloadAction, Launcher, SystemLauncher};
use tubeloader::extractor::models::format_size;
use tubeloader::utils::clipboard;
use tubeloader::{
    AppSettings, EndpointConfig, FormatDescriptor, Lookup, ProviderKind, Tubeloader, VideoListing,
};

#[derive(Parser)]
#[command(name = "tubeloader", version, about = "Look up downloadable formats of a YouTube video")]
struct Args {
    /// Video URL (watch, youtu.be, shorts, embed or live link)
    url: Option<String>,

    /// Read the URL from the clipboard
    #[arg(long, conflicts_with = "url")]
    clipboard: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Provider kind for the following --instance values
    /// (invidious, piped, cobalt, ytdlp)
    #[arg(long, value_name = "KIND", requires = "instance")]
    provider: Vec<ProviderKind>,

    /// Endpoint base URL; replaces the configured endpoint list
    #[arg(long, value_name = "URL", requires = "provider")]
    instance: Vec<String>,

    /// Per-endpoint timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Pick the best format at or below this resolution
    #[arg(long, value_name = "N")]
    quality: Option<u32>,

    /// Open the selected URL in the browser
    #[arg(long)]
    open: bool,

    /// Copy the selected URL to the clipboard
    #[arg(long)]
    copy: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_config: bool,

    /// Debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Warnings and errors only
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config_path = args.config.clone().unwrap_or_else(AppSettings::default_path);
    let mut settings = AppSettings::load(&config_path)
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    apply_overrides(&mut settings, &args)?;

    if args.save_config {
        settings
            .save(&config_path)
            .with_context(|| format!("Failed to save settings to {}", config_path.display()))?;
        eprintln!("Settings saved to {}", config_path.display());
    }

    let input = match (&args.url, args.clipboard) {
        (Some(url), _) => url.clone(),
        (None, true) => clipboard::get_clipboard_content()?,
        (None, false) if args.save_config => return Ok(()),
        (None, false) => bail!("No URL given (pass one or use --clipboard)"),
    };

    let service = Tubeloader::from_settings(&settings)?;
    let quality = args.quality.or(settings.preferred_quality);

    let rt = tokio::runtime::Runtime::new()?;
    let lookup = rt.block_on(service.lookup(&input))?;

    match lookup {
        Lookup::Listing(listing) => {
            let selected = select(&listing, quality);
            let action = selected.map(DownloadAction::for_format);
            if args.json {
                let output = serde_json::json!({
                    "listing": &listing,
                    "selected": selected,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_listing(&listing, selected);
            }
            if let Some(action) = action {
                hand_off(&action, &args, &SystemLauncher)?;
            }
        }
        Lookup::Redirect { url, cause } => {
            warn!("No endpoint could list formats: {}", cause);
            if args.json {
                let output = serde_json::json!({
                    "redirect": &url,
                    "cause": cause.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("Redirect: {}", url);
            }
            hand_off(&DownloadAction::for_url(url), &args, &SystemLauncher)?;
        }
    }

    Ok(())
}

/// Fold command-line overrides into the loaded settings
fn apply_overrides(settings: &mut AppSettings, args: &Args) -> Result<()> {
    if !args.instance.is_empty() {
        let kinds: Vec<ProviderKind> = match args.provider.len() {
            1 => vec![args.provider[0]; args.instance.len()],
            n if n == args.instance.len() => args.provider.clone(),
            n => bail!(
                "{} --provider values for {} --instance values (give one, or one per instance)",
                n,
                args.instance.len()
            ),
        };
        settings.endpoints = kinds
            .into_iter()
            .zip(&args.instance)
            .map(|(kind, url)| EndpointConfig::new(kind, url.trim()))
            .collect();
    }
    if let Some(secs) = args.timeout {
        settings.attempt_timeout_secs = secs;
    }
    if let Some(quality) = args.quality {
        settings.preferred_quality = Some(quality);
    }
    settings.validate()?;
    Ok(())
}

/// Best entry at or below `quality`, else the overall best
fn select(listing: &VideoListing, quality: Option<u32>) -> Option<&FormatDescriptor> {
    quality
        .and_then(|q| listing.catalog.closest_at_most(q))
        .or_else(|| listing.catalog.best())
}

fn print_listing(listing: &VideoListing, selected: Option<&FormatDescriptor>) {
    let details = &listing.details;
    println!("{}", details.title.as_deref().unwrap_or("(untitled)"));
    if let Some(author) = &details.author {
        println!("by {}", author);
    }
    if let Some(secs) = details.duration_secs {
        println!("Duration: {}:{:02}", secs / 60, secs % 60);
    }
    println!("Source: {} via {}", listing.id.watch_url(), listing.provider);
    println!();

    for format in &listing.catalog {
        let marker = if selected == Some(format) { "*" } else { " " };
        println!("{} {}", marker, format.display_label());
    }

    if let Some(selected) = selected {
        println!();
        let size = format_size(selected.file_size).unwrap_or_else(|| "unknown size".to_string());
        println!("Selected {} ({})", selected.quality_label(), size);
        println!("{}", selected.url);
    }
}

fn hand_off(action: &DownloadAction, args: &Args, launcher: &dyn Launcher) -> Result<()> {
    if args.copy {
        clipboard::set_clipboard_content(&action.url)?;
    }
    if args.open {
        action.execute(launcher)?;
    }
    Ok(())
}
