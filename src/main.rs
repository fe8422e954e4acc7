//! fsgc - filesystem garbage collector.
//!
//! Usage:
//!   fsgc [--root PATH]           Collect under PATH (default: current directory)
//!   fsgc --config fsgc.toml      Override marker pattern, suffix units, policy file name
//!   fsgc --trash                 Move entries to the trash instead of deleting them
//!   fsgc --json                  Print the run report as JSON
//!   fsgc --help                  Show help

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use color_eyre::eyre::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fsgc_collect::{Collector, FsRemover, Remover, TrashRemover};
use fsgc_core::{GcSettings, MatchScope};

#[derive(Parser, Debug)]
#[command(
    name = "fsgc",
    version,
    about = "Remove expired and over-retained files from a directory tree",
    long_about = "fsgc walks a directory tree and removes entries whose path carries an \
                  expired TTL marker (e.g. `ttl=3` for three days, `ttl=2h` for two hours).\n\n\
                  A directory containing an `fsgc.json` policy such as \
                  `{\"master.*\\\\.tar\\\\.gz\": 4}` additionally keeps only the newest \
                  matching files."
)]
struct Cli {
    /// The root for cleaning up
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// TOML settings file (marker, suffixes, policy_file, match_scope)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Match TTL markers against file names only, ignoring ancestor directories
    #[arg(long)]
    basename_only: bool,

    /// Move entries to the system trash instead of deleting them
    #[arg(long)]
    trash: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Exit with an error when the root cannot be walked
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    /// Default log level when `RUST_LOG` is not set.
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_level());

    let mut settings = load_settings(cli.config.as_deref())?;
    if cli.basename_only {
        settings.match_scope = MatchScope::BaseName;
    }
    let config = settings.into_config().context("Invalid configuration")?;

    let remover: Box<dyn Remover> = if cli.trash {
        Box::new(TrashRemover)
    } else {
        Box::new(FsRemover)
    };
    let collector = Collector::new(config).with_boxed_remover(remover);
    info!(
        root = %cli.root.display(),
        policy_file = %collector.config().policy_file,
        scope = ?collector.config().match_scope,
        trash = cli.trash,
        "Starting fsgc"
    );
    let report = collector.collect(&cli.root);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if cli.strict {
        if let Some(err) = &report.root_error {
            bail!("Collection failed: {err}");
        }
    }

    Ok(())
}

/// Install the global tracing subscriber, logging to stderr.
fn init_logging(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

/// Read settings from a TOML file, or use the built-in defaults.
fn load_settings(path: Option<&Path>) -> Result<GcSettings> {
    let Some(path) = path else {
        return Ok(GcSettings::default());
    };

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read settings file {}", path.display()))?;
    let settings = toml::from_str(&data)
        .with_context(|| format!("Cannot parse settings file {}", path.display()))?;
    Ok(settings)
}
