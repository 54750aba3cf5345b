//! sigma-bdcl - Batch driver
//!
//! Walks a directory of already-parsed Sigma rule fixtures (JSON or YAML,
//! shaped like [`sigma_bdcl::model::ParsedRule`] — the Sigma YAML frontend
//! parser itself is out of scope, see DESIGN.md), applies an ignore-list
//! file (one filename pattern per line, mirroring the original batch
//! driver's `ignore-filename.txt`), and compiles each rule into BDCL.
//! Per-file failures are logged and skipped; the process exits non-zero if
//! any file failed.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sigma_bdcl::backend::csv::CSV_HEADER;
use sigma_bdcl::config::{Options, SigmaConfig};
use sigma_bdcl::model::ParsedRule;

/// Compile a directory of Sigma rule fixtures into BDCL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing parsed rule fixtures (*.json or *.yml/*.yaml)
    #[arg(short, long, value_name = "DIR")]
    rules_dir: PathBuf,

    /// Field-mapping configuration (sigmaconfig) YAML
    #[arg(long, value_name = "FILE")]
    sigmaconfig: PathBuf,

    /// Options YAML (general/others/outputCSV)
    #[arg(long, value_name = "FILE")]
    options: PathBuf,

    /// One filename substring per line; matching files are skipped
    #[arg(long, value_name = "FILE")]
    ignore_list: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    info!("sigma-bdcl v{}", env!("CARGO_PKG_VERSION"));

    let config = SigmaConfig::load(&cli.sigmaconfig)?;
    let options = Options::load(&cli.options)?;
    let ignore_list = load_ignore_list(cli.ignore_list.as_deref())?;

    if options.output_csv {
        println!("{}", CSV_HEADER);
    }

    let mut any_failed = false;
    for entry in walkdir::WalkDir::new(&cli.rules_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if ignore_list.iter().any(|pattern| name.contains(pattern)) {
            continue;
        }
        if !matches!(path.extension().and_then(|e| e.to_str()), Some("json" | "yml" | "yaml")) {
            continue;
        }

        match compile_one(path, &config, &options) {
            Ok(bdcl) => println!("{}", bdcl),
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to compile rule, skipping");
                any_failed = true;
            }
        }
    }

    if any_failed {
        error!("one or more rule files failed to compile");
        std::process::exit(1);
    }
    Ok(())
}

fn compile_one(path: &Path, config: &SigmaConfig, options: &Options) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)?;
    let rule: ParsedRule = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(sigma_bdcl::compile(&rule, config, options)?)
}

fn load_ignore_list(path: Option<&Path>) -> anyhow::Result<Vec<String>> {
    match path {
        Some(p) => Ok(std::fs::read_to_string(p)?
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()),
        None => Ok(Vec::new()),
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let level = level
        .parse::<tracing::Level>()
        .map_err(|_| anyhow::anyhow!("invalid log level: {}", level))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}
