//! jsonsan: Flatten nested inline objects of JSON Schemas into `definitions`
//!
//! Every input is rewritten independently and written next to itself with a
//! `.san` suffix. The sanitized schema is also printed to stdout.
//!
//! Usage:
//!   # Sanitize two schemas, writing person.json.san and order.json.san
//!   jsonsan person.json order.json
//!
//!   # Compact output, no echo to stdout
//!   jsonsan --compact --quiet schemas/*.json
//!
//!   # Draft 2019+ style definitions
//!   jsonsan --definitions-key '$defs' schema.json

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use clap::Parser;
use jsonsan::{sanitize_file, OutputConfig, UnnestConfig, Unnester};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(name = "jsonsan")]
#[command(about = "Move nested inline objects of JSON Schemas into definitions", long_about = None)]
struct Args {
    /// JSON Schema files to sanitize
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Extension appended to each input file name for the output (default: "san")
    #[arg(long)]
    suffix: Option<String>,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,

    /// Root key holding definitions (default: "definitions")
    #[arg(long)]
    definitions_key: Option<String>,

    /// Suffix naming externalized array items (default: "_item")
    #[arg(long)]
    item_suffix: Option<String>,

    /// Log every inspected property
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    verbose: bool,

    /// Don't print sanitized schemas, only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else if args.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();

    // Build config
    let mut unnest_config = UnnestConfig::default();
    if let Some(key) = args.definitions_key {
        unnest_config.definitions_key = key;
    }
    if let Some(suffix) = args.item_suffix {
        unnest_config.item_suffix = suffix;
    }

    let mut output_config = OutputConfig::default();
    if let Some(suffix) = args.suffix {
        output_config.suffix = suffix;
    }
    output_config.compact = args.compact;

    let unnester = Unnester::new(unnest_config);

    for input in &args.inputs {
        match sanitize_file(input, &unnester, &output_config) {
            Ok(file) => {
                if !args.quiet {
                    println!("{}", file.rendered);
                }
                debug!(report = %serde_json::to_string(&file.report)?, "unnest report");
                info!(
                    "Wrote {} ({} definitions externalized)",
                    file.output.display(),
                    file.report.externalized.len()
                );
            }
            Err(err) => error!("{:#}", err),
        }
    }

    Ok(())
}
