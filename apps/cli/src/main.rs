//! `cobalt` - convert C-CDA documents to FHIR R4 Bundles
//!
//! ```text
//! cobalt convert ccd.xml -o bundle.json --pretty --outcome outcome.json
//! cobalt parse ccd.xml --raw
//! ```

mod logging;
mod settings;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use cobalt_convert::{ccda_parse_options, convert_bytes, IdStrategy};
use cobalt_models::{BundleType, Resource};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "cobalt", version, about = "C-CDA to FHIR R4 conversion")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a C-CDA document into a FHIR Bundle
    Convert {
        input: PathBuf,

        /// Write the Bundle here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        pretty: bool,

        /// Settings file (TOML, JSON, YAML, ...)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write an OperationOutcome listing skipped sections
        #[arg(long)]
        outcome: Option<PathBuf>,

        /// Produce a `document` Bundle
        #[arg(long)]
        document: bool,

        #[arg(long)]
        fail_fast: bool,

        #[arg(long)]
        random_ids: bool,
    },
    /// Print the parsed document tree as JSON
    Parse {
        input: PathBuf,

        /// Keep null-flavored elements
        #[arg(long)]
        raw: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.log_json).context("Failed to initialize logging")?;

    match cli.command {
        Command::Convert {
            input,
            output,
            pretty,
            config,
            outcome,
            document,
            fail_fast,
            random_ids,
        } => {
            let mut options = settings::load(config.as_deref())?;
            if document {
                options.bundle_type = BundleType::Document;
            }
            if fail_fast {
                options.fail_fast = true;
            }
            if random_ids {
                options.id_strategy = IdStrategy::Random;
            }

            let xml = read_input(&input)?;
            let conversion = convert_bytes(&xml, &options)
                .with_context(|| format!("Failed to convert {}", input.display()))?;

            if !conversion.is_complete() {
                tracing::warn!(
                    skipped = conversion.failures.len(),
                    "Some sections could not be converted"
                );
            }

            write_json(output.as_deref(), &conversion.bundle, pretty)?;
            if let Some(path) = outcome {
                let outcome = Resource::from(conversion.operation_outcome());
                write_json(Some(&path), &outcome, pretty)?;
            }
        }
        Command::Parse { input, raw } => {
            let xml = read_input(&input)?;
            let text = std::str::from_utf8(&xml)
                .with_context(|| format!("{} is not valid UTF-8", input.display()))?;
            let tree = cobalt_ccda_format::parse_with_options(text, &ccda_parse_options())
                .with_context(|| format!("Failed to parse {}", input.display()))?;

            let json = if raw {
                tree.to_json()
            } else {
                cobalt_ccda_model::sanitize(&tree)
                    .map(|node| node.to_json())
                    .unwrap_or(serde_json::Value::Null)
            };
            write_json(None, &json, true)?;
        }
    }

    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_json<T: Serialize>(path: Option<&Path>, value: &T, pretty: bool) -> anyhow::Result<()> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    bytes.push(b'\n');

    match path {
        Some(path) => {
            fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote output");
        }
        None => std::io::stdout()
            .lock()
            .write_all(&bytes)
            .context("Failed to write to stdout")?,
    }
    Ok(())
}
