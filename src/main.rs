use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use travel_advisories::config::Config;
use travel_advisories::feed::{load_entries, FeedSource, FetchLimits};
use travel_advisories::pipeline::{self, parse_combine_list};

#[derive(Parser, Debug)]
#[command(
    name = "travel-advisories",
    about = "Republish U.S. State Department travel advisories as per-country JSON feeds"
)]
struct Args {
    /// Directory to write feeds into (existing *.json files are removed)
    #[arg(long, env = "OUTPUT_DIR", value_name = "DIR")]
    output_dir: PathBuf,

    /// Comma-separated slugs to merge into combined.json
    #[arg(long, env = "COMBINE_COUNTRIES", value_name = "SLUGS", default_value = "")]
    combine_countries: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// TOML file overriding source and feed URLs
    #[arg(long, env = "TRAVEL_ADVISORIES_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Read the upstream RSS document from a file instead of fetching it
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let source = match args.input {
        Some(path) => FeedSource::File(path),
        None => FeedSource::Url(config.source_url.clone()),
    };
    let limits = FetchLimits {
        timeout: config.fetch_timeout(),
        max_bytes: config.max_document_bytes,
    };

    let client = reqwest::Client::new();
    let parsed = load_entries(&client, &source, limits)
        .await
        .with_context(|| format!("Failed to load advisories from {source}"))?;

    let combine = parse_combine_list(&args.combine_countries);
    let summary = pipeline::run(
        &config.feed_settings(),
        parsed.entries,
        &args.output_dir,
        combine.as_deref(),
    )
    .with_context(|| format!("Failed to write feeds to {}", args.output_dir.display()))?;

    tracing::debug!(
        files = summary.written.len(),
        countries = summary.countries,
        skipped = summary.skipped,
        "Done"
    );
    Ok(())
}
