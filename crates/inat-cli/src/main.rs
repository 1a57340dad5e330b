//! `inat`: download the iNaturalist open-data archive and load it into a
//! database.
//!
//! Settings come from `inat.toml` (or the path given with `--config`) and
//! `INAT_*` environment variables; flags override both.
//!
//! ```text
//! inat dl                      # fetch and extract into the data directory
//! inat load -t taxon -t user   # load only some tables
//! inat -v all                  # both, with per-table timings
//! ```

mod progress;
mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand};
use inat_archive::Fetcher;
use inat_core::{entity::Entity, progress::ProgressSink};
use inat_ingest::{LoadOptions, LoadReport, load_all_uri};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{
  progress::TerminalProgress,
  settings::{Settings, expand_tilde},
};

#[derive(Parser)]
#[command(author, version, about = "iNaturalist open data downloader and loader")]
struct Cli {
  /// Show additional information (-vv for debug output).
  #[arg(short, long, action = ArgAction::Count, global = true)]
  verbose: u8,

  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "inat.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Download and extract the metadata archive.
  Dl(DownloadArgs),
  /// Load extracted files into a database.
  Load(LoadArgs),
  /// Download, extract, then load.
  All(LoadArgs),
}

#[derive(Args)]
struct DownloadArgs {
  /// Directory to download and extract into.
  #[arg(short, long)]
  download_dir: Option<PathBuf>,
}

#[derive(Args)]
struct LoadArgs {
  /// Database URI, e.g. `sqlite:////var/lib/inat.db`.
  #[arg(short, long)]
  uri: Option<String>,

  /// Directory holding the extracted files.
  #[arg(short, long)]
  download_dir: Option<PathBuf>,

  /// Load only this table; repeat for several.
  #[arg(short = 't', long = "table", value_name = "ENTITY")]
  tables: Vec<Entity>,

  /// Rows per insert batch.
  #[arg(short, long)]
  batch_size: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let cli = Cli::parse();

  // Initialise tracing.
  let level = match cli.verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to read configuration from {:?}", cli.config))?;
  let verbose = cli.verbose > 0;

  match cli.command {
    Command::Dl(args) => {
      let dir = resolve_dir(&settings, args.download_dir);
      download(&settings, dir).await
    }
    Command::Load(args) => load(&settings, args, verbose).await,
    Command::All(args) => {
      let dir = resolve_dir(&settings, args.download_dir.clone());
      download(&settings, dir).await?;
      load(&settings, args, verbose).await
    }
  }
}

fn resolve_dir(settings: &Settings, dir: Option<PathBuf>) -> PathBuf {
  dir
    .map(|d| expand_tilde(&d))
    .unwrap_or_else(|| settings.data_dir.clone())
}

async fn download(settings: &Settings, dir: PathBuf) -> anyhow::Result<()> {
  let progress: Arc<dyn ProgressSink> = Arc::new(TerminalProgress::bytes());

  let fetcher =
    Fetcher::with_url(&settings.archive_url).context("failed to build HTTP client")?;
  let archive = fetcher
    .fetch(&dir, progress.as_ref())
    .await
    .with_context(|| format!("failed to download {}", fetcher.url()))?;
  println!("Archive: {}", archive.display());

  let files = {
    let (source, dest) = (archive.clone(), dir.clone());
    tokio::task::spawn_blocking(move || {
      inat_archive::extract(&source, &dest, progress.as_ref())
    })
    .await
    .context("extraction task failed")?
    .with_context(|| format!("failed to extract {}", archive.display()))?
  };
  println!("Extracted {} files to {}", files.len(), dir.display());
  Ok(())
}

async fn load(settings: &Settings, args: LoadArgs, verbose: bool) -> anyhow::Result<()> {
  // The default database lives in the data directory.
  if args.uri.is_none() && settings.db_uri.is_none() {
    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
      format!("failed to create {}", settings.data_dir.display())
    })?;
  }

  let dir = resolve_dir(settings, args.download_dir);
  let uri = args.uri.unwrap_or_else(|| settings.db_uri());

  let entities = if args.tables.is_empty() {
    &settings.entities
  } else {
    &args.tables
  };
  let options = LoadOptions::new(&dir)
    .with_batch_size(args.batch_size.unwrap_or(settings.batch_size))
    .with_entities(entities)
    .with_verbose(verbose);

  let progress: Arc<dyn ProgressSink> = Arc::new(TerminalProgress::rows());
  let report = load_all_uri(&uri, &options, progress)
    .await
    .with_context(|| format!("failed to open database {uri}"))?;

  print_report(&report);
  Ok(())
}

fn print_report(report: &LoadReport) {
  for table in &report.tables {
    let name = table.entity.to_string();
    match &table.outcome {
      Ok(rows) => println!(
        "{name:<12} {rows:>12} rows in {:.2}s",
        table.elapsed.as_secs_f64()
      ),
      Err(e) => println!("{name:<12} failed: {e}"),
    }
  }
  println!(
    "Loaded {} rows into {} ({} of {} tables)",
    report.total_rows(),
    report.target,
    report.succeeded().count(),
    report.tables.len(),
  );
}
