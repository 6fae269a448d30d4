use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use sentinel_fetch::{
    BatchDownloader, BoundingBox, Credentials, SearchCriteria, Settings, ZipDirectorySink,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Download Sentinel-2 tiles from the Copernicus Data Space catalog.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Copernicus username
    #[arg(short, long)]
    username: String,

    /// Copernicus password
    #[arg(short, long)]
    password: String,

    /// Bounding box in format: "min_lon min_lat max_lon max_lat"
    #[arg(short, long, allow_hyphen_values = true)]
    bbox: BoundingBox,

    /// Start date in format YYYY-MM-DD (inclusive)
    #[arg(short, long)]
    start_date: NaiveDate,

    /// End date in format YYYY-MM-DD (exclusive)
    #[arg(short, long)]
    end_date: NaiveDate,

    /// Maximum cloud cover percentage
    #[arg(short, long)]
    cloud_cover: f64,

    /// Directory to store downloaded files
    #[arg(short, long)]
    download_path: PathBuf,

    /// Settings file with endpoints and download options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip products already present in the download path
    #[arg(long)]
    skip_existing: bool,

    /// Write a JSON report of every download outcome
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::read(path)
            .with_context(|| format!("Unable to read settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.skip_existing |= cli.skip_existing;

    let criteria = SearchCriteria::new(cli.bbox, cli.start_date, cli.end_date, cli.cloud_cover)?;
    let credentials = Credentials::new(cli.username, cli.password);
    let sink = ZipDirectorySink::new(&cli.download_path);

    let downloader = BatchDownloader::new(settings, sink);
    let report = downloader.run(&criteria, &credentials).await?;

    if let Some(path) = &cli.report {
        report
            .write(path)
            .with_context(|| format!("Unable to write report to {}", path.display()))?;
    }

    println!("Total tiles found: {}", report.found);
    if !report.is_empty() {
        println!(
            "Downloaded: {}, skipped: {}, failed: {}",
            report.downloaded(),
            report.skipped(),
            report.failures().count()
        );
        for failure in report.failures() {
            println!("  failed: {}", failure.identifier());
        }
    }

    Ok(())
}
