use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use clap::{Args, Parser, Subcommand};
use fieldcanvas::cache::{AssetCache, CacheError, FetchError, FileStore, HttpFetcher};
use fieldcanvas::config::{CacheConfig, CanvasConfig, HttpTimeouts};
use fieldcanvas::export::{ExportError, FieldMapping, FieldValues, FormFiller};
use fieldcanvas::field::FieldConfig;
use fieldcanvas::model::PositionMap;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON in {}: {source}", path.display())]
    InvalidJson { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Client(#[from] FetchError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("report encoding failed: {0}")]
    Report(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "fieldcanvas", about = "Cached PDF retrieval and form filling")]
struct Cli {
    /// Persistent cache directory.
    #[arg(long, env = "FIELDCANVAS_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a PDF through the asset cache and write it to disk.
    Fetch {
        url: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write field values into a PDF form.
    Fill(FillArgs),
}

#[derive(Args, Debug)]
struct FillArgs {
    /// Source PDF: an http(s) URL (served through the cache) or a local path.
    #[arg(long)]
    pdf: String,
    /// JSON object of field key to value.
    #[arg(long)]
    values: PathBuf,
    /// JSON object of field key to `{ "top": .., "left": .. }`.
    #[arg(long)]
    positions: PathBuf,
    /// JSON object of field key to widget name. Defaults to exact-name matching.
    #[arg(long)]
    mapping: Option<PathBuf>,
    /// JSON array of field descriptors, used to recognise checkboxes.
    #[arg(long)]
    fields: Option<PathBuf>,
    #[arg(long, env = "FIELDCANVAS_FONT_SIZE")]
    font_size: Option<f64>,
    #[arg(long)]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = CacheConfig::from_env();
    if let Some(dir) = cli.cache_dir {
        config.dir = dir;
    }

    match cli.command {
        Command::Fetch { url, out } => run_fetch(config, &url, &out).await,
        Command::Fill(args) => run_fill(config, args).await,
    }
}

fn build_cache(config: CacheConfig) -> Result<AssetCache, CliError> {
    let store = Arc::new(FileStore::new(config.dir.clone()));
    let fetcher = Arc::new(HttpFetcher::new(HttpTimeouts::from_env())?);
    Ok(AssetCache::new(config, store, fetcher))
}

async fn run_fetch(config: CacheConfig, url: &str, out: &Path) -> Result<(), CliError> {
    let cache = build_cache(config)?;
    let bytes = cache.get(url).await?;
    write_file(out, &bytes).await?;

    let stats = cache.stats();
    tracing::info!(%url, out = %out.display(), size = bytes.len(), persistent_hits = stats.persistent_hits, "pdf written");
    Ok(())
}

async fn run_fill(config: CacheConfig, args: FillArgs) -> Result<(), CliError> {
    let font_size = args.font_size.unwrap_or_else(|| CanvasConfig::from_env().font_size_pt);

    let values: FieldValues = read_json(&args.values).await?;
    let positions: PositionMap = read_json(&args.positions).await?;

    let mut filler = FormFiller::new().font_size(font_size);
    if let Some(path) = &args.mapping {
        let mapping: FieldMapping = read_json(path).await?;
        filler = filler.mapping(mapping);
    }
    if let Some(path) = &args.fields {
        let fields: Vec<FieldConfig> = read_json(path).await?;
        filler = filler.fields(&fields);
    }

    let pdf = load_pdf(config, &args.pdf).await?;
    let outcome = filler.fill(&pdf, &values, &positions)?;
    write_file(&args.out, &outcome.bytes).await?;

    tracing::info!(
        out = %args.out.display(),
        filled = outcome.report.filled.len(),
        warnings = outcome.report.warning_count(),
        "filled pdf written"
    );
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);
    Ok(())
}

async fn load_pdf(config: CacheConfig, source: &str) -> Result<Bytes, CliError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let cache = build_cache(config)?;
        return Ok(cache.get(source).await?);
    }
    let path = Path::new(source);
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    Ok(Bytes::from(raw))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&raw).map_err(|source| CliError::InvalidJson { path: path.to_path_buf(), source })
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| CliError::Write { path: path.to_path_buf(), source })
}
