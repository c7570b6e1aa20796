//! geoslim CLI - fetch and simplify boundary shapefiles

mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geoslim_algorithms::vector::{
    simplify_file, summarize, AttributeMatch, RegionFilter, SimplifyMethod, SimplifyOptions,
    SimplifyParams, SimplifyReport,
};
use geoslim_cloud::blocking::fetch_archive;
use geoslim_cloud::{extract_archive_file, find_layer_in, FetchOptions};
use geoslim_core::io::{check_destination, read_layer, WriteOptions};
use geoslim_core::Stage;

use crate::error::CliError;

/// Statistics Canada 2021 provinces and territories, cartographic boundary file.
const AFTER_HELP: &str = "Reference data (provinces and territories, Lambert conformal conic, metres):
  https://www12.statcan.gc.ca/census-recensement/2021/geo/sip-pis/boundary-limites/files-fichiers/lpr_000b21a_e.zip";

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "geoslim")]
#[command(author, version, about = "Fetch and simplify administrative boundary shapefiles", long_about = None)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simplify every geometry of a shapefile layer
    Simplify {
        /// Input layer (.shp)
        input: PathBuf,
        /// Output layer (.shp)
        output: PathBuf,
        #[command(flatten)]
        simplify: SimplifyArgs,
    },
    /// Download a ZIP archive and extract it into a directory
    Fetch {
        /// URL of the archive, or a local path with --archive
        source: String,
        /// Destination directory
        dest: PathBuf,
        /// Treat SOURCE as a ZIP file on disk
        #[arg(long)]
        archive: bool,
        /// Request timeout in seconds
        #[arg(long, default_value = "120")]
        timeout: u64,
    },
    /// Show information about a shapefile layer
    Info {
        /// Input layer (.shp)
        input: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Fetch an archive, pick its layer and simplify it
    Run {
        /// URL of the ZIP archive
        #[arg(long)]
        url: String,
        /// Directory the archive is extracted into
        #[arg(long)]
        workdir: PathBuf,
        /// Layer to simplify (file stem); required when the archive holds several
        #[arg(long)]
        layer: Option<String>,
        /// Output layer (.shp)
        output: PathBuf,
        /// Request timeout in seconds
        #[arg(long, default_value = "120")]
        timeout: u64,
        #[command(flatten)]
        simplify: SimplifyArgs,
    },
}

#[derive(clap::Args)]
struct SimplifyArgs {
    /// Tolerance in the layer's linear unit (metres for the reference data)
    #[arg(long = "simplify", visible_alias = "tolerance", value_name = "TOLERANCE", allow_negative_numbers = true)]
    tolerance: f64,
    /// Method: dp (Douglas-Peucker) or vw (Visvalingam-Whyatt)
    #[arg(short, long, default_value = "dp")]
    method: String,
    /// Replace an existing output layer
    #[arg(short, long)]
    force: bool,
    /// Accept a tolerance in degrees for layers in a geographic CRS
    #[arg(long)]
    allow_geographic: bool,
    /// Leave out records whose FIELD equals VALUE (repeatable)
    #[arg(long = "drop", value_name = "FIELD=VALUE")]
    drop: Vec<String>,
    /// Only process records whose FIELD equals VALUE (repeatable)
    #[arg(long = "keep", value_name = "FIELD=VALUE")]
    keep: Vec<String>,
}

impl SimplifyArgs {
    fn options(&self) -> Result<SimplifyOptions> {
        Ok(SimplifyOptions {
            params: SimplifyParams {
                tolerance: self.tolerance,
                method: parse_method(&self.method)?,
            },
            overwrite: self.force,
            allow_geographic: self.allow_geographic,
            filter: RegionFilter {
                drop: parse_matches(&self.drop)?,
                keep: parse_matches(&self.keep)?,
            },
        })
    }
}

fn parse_matches(conditions: &[String]) -> Result<Vec<AttributeMatch>> {
    conditions
        .iter()
        .map(|c| c.parse::<AttributeMatch>().map_err(Into::into))
        .collect()
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {}", e);
    }
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// Status goes to stderr; stdout carries only `info` output
fn done(name: &str, path: &Path, elapsed: Duration) {
    eprintln!("{} saved to: {}", name, path.display());
    eprintln!("  Processing time: {:.2?}", elapsed);
}

fn parse_method(s: &str) -> Result<SimplifyMethod> {
    match s.to_lowercase().as_str() {
        "dp" | "douglas-peucker" | "rdp" => Ok(SimplifyMethod::DouglasPeucker),
        "vw" | "visvalingam" | "visvalingam-whyatt" => Ok(SimplifyMethod::VisvalingamWhyatt),
        _ => Err(geoslim_core::Error::InvalidParameter {
            name: "method",
            value: s.to_string(),
            reason: "use dp or vw".to_string(),
        }
        .into()),
    }
}

fn fetch_options(timeout: u64) -> FetchOptions {
    FetchOptions {
        request_timeout: Duration::from_secs(timeout),
        ..FetchOptions::default()
    }
}

fn print_report(report: &SimplifyReport) {
    eprintln!(
        "  Records: {}, vertices: {} -> {} ({:.1}% removed)",
        report.records,
        report.vertices_before,
        report.vertices_after,
        report.reduction() * 100.0
    );
    if report.filtered > 0 {
        eprintln!("  Records filtered out: {}", report.filtered);
    }
    if report.dropped_rings > 0 || report.kept_original > 0 {
        eprintln!(
            "  Rings dropped: {}, features kept unsimplified: {}",
            report.dropped_rings, report.kept_original
        );
    }
}

fn simplify(input: &Path, output: &Path, options: &SimplifyOptions) -> Result<SimplifyReport> {
    let pb = spinner("Simplifying...");
    let result = simplify_file(input, output, options);
    pb.finish_and_clear();
    result.with_context(|| format!("simplifying {}", input.display()))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Usage errors are input errors; --help and --version are not
            return if e.use_stderr() {
                ExitCode::from(Stage::Input.exit_code())
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    setup_logging(cli.verbose);

    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let e = CliError::from(e);
            e.report();
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute(command: Commands) -> Result<()> {
    match command {
        // ── Simplify ─────────────────────────────────────────────────
        Commands::Simplify {
            input,
            output,
            simplify: args,
        } => {
            let options = args.options()?;
            let start = Instant::now();
            let report = simplify(&input, &output, &options)?;
            done("Simplified layer", &output, start.elapsed());
            print_report(&report);
        }

        // ── Fetch ────────────────────────────────────────────────────
        Commands::Fetch {
            source,
            dest,
            archive,
            timeout,
        } => {
            let start = Instant::now();
            let files = if archive {
                let pb = spinner("Extracting...");
                let result = extract_archive_file(Path::new(&source), &dest);
                pb.finish_and_clear();
                result.with_context(|| format!("extracting {}", source))?
            } else {
                let pb = spinner("Downloading...");
                let result = fetch_archive(&source, &dest, fetch_options(timeout));
                pb.finish_and_clear();
                let fetched = result.with_context(|| format!("fetching {}", source))?;
                info!("{} bytes downloaded", fetched.bytes);
                fetched.files
            };
            done("Archive", &dest, start.elapsed());
            eprintln!("  Files: {}", files.len());
            for path in files.iter().filter(|p| p.extension().is_some_and(|e| e == "shp")) {
                eprintln!("  Layer: {}", path.display());
            }
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, json } => {
            let layer =
                read_layer(&input).with_context(|| format!("reading {}", input.display()))?;
            let summary = summarize(&layer);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("File: {}", input.display());
                print!("{}", summary);
            }
        }

        // ── Run ──────────────────────────────────────────────────────
        Commands::Run {
            url,
            workdir,
            layer,
            output,
            timeout,
            simplify: args,
        } => {
            let options = args.options()?;
            // Refuse bad parameters and outputs before downloading anything
            options.params.validate()?;
            check_destination(
                &output,
                &WriteOptions {
                    overwrite: options.overwrite,
                },
            )?;
            let start = Instant::now();

            let pb = spinner("Downloading...");
            let result = fetch_archive(&url, &workdir, fetch_options(timeout));
            pb.finish_and_clear();
            let fetched = result.with_context(|| format!("fetching {}", url))?;

            let input = find_layer_in(&workdir, &fetched.layers(), layer.as_deref())
                .with_context(|| format!("choosing a layer in {}", workdir.display()))?;
            info!("layer: {}", input.display());

            let report = simplify(&input, &output, &options)?;
            done("Simplified layer", &output, start.elapsed());
            print_report(&report);
        }
    }
    Ok(())
}
