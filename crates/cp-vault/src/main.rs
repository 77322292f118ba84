//! canvas-props CLI
//!
//! Keeps canvas connections and document front matter in sync:
//! - `push`: write what each canvas connection implies into the documents
//! - `synthesize`: lay out a new canvas from a document's list properties
//! - `pull`: add a document's list properties to a canvas that shows it
//! - `affected`: list documents touched by the edge changes between two
//!   versions of a canvas

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use cp_core::sync::{self, Notice, Outcome};
use cp_core::{EdgeDeltaTracker, WriteMode, affected_documents, build_graph, parse_canvas};
use cp_vault::{CANVAS_EXTENSION, MARKDOWN_EXTENSION, SETTINGS_FILE, Vault, load_settings};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "canvas-props")]
#[command(author, version, about = "Sync canvas connections with document properties")]
struct Cli {
    /// Vault root
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,
    /// Settings file (default: `<vault>/.canvas-props.json`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write canvas-implied properties into the documents on a canvas.
    Push {
        canvas: PathBuf,
        /// Add to existing values instead of replacing them
        #[arg(long)]
        append: bool,
    },

    /// Create a canvas from a document's list properties.
    Synthesize {
        document: PathBuf,
        /// Replace an existing canvas at the output path
        #[arg(long)]
        force: bool,
    },

    /// Add a document's list properties to a canvas that shows it.
    Pull {
        canvas: PathBuf,
        document: PathBuf,
        /// Only connect values already on the canvas
        #[arg(long)]
        existing_only: bool,
    },

    /// List documents affected by edge changes since a previous version.
    Affected {
        /// Earlier copy of the canvas (may live outside the vault)
        previous: PathBuf,
        canvas: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// Vault path of `path` if it has the `expected` extension.
fn vault_file(vault: &Vault, path: &Path, expected: &'static str) -> Result<Result<String, Notice>> {
    let resolved = vault
        .vault_path(path)
        .ok_or_else(|| anyhow!("{} is not inside the vault", path.display()))?;
    if path.extension().and_then(|e| e.to_str()) != Some(expected) {
        return Ok(Err(Notice::WrongFileType {
            path: resolved,
            expected,
        }));
    }
    Ok(Ok(resolved))
}

macro_rules! file_or_notice {
    ($vault:expr, $path:expr, $ext:expr) => {
        match vault_file($vault, $path, $ext)? {
            Ok(path) => path,
            Err(notice) => {
                println!("{notice}");
                return Ok(());
            }
        }
    };
}

fn done<T>(outcome: Outcome<T>) -> Option<T> {
    if let Some(notice) = outcome.notice() {
        println!("{notice}");
    }
    outcome.done()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut vault = Vault::open(&cli.vault)
        .with_context(|| format!("opening vault {}", cli.vault.display()))?;
    let settings_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.vault.join(SETTINGS_FILE));
    let settings = load_settings(&settings_path)?;

    match cli.command {
        Commands::Push { canvas, append } => {
            let canvas = file_or_notice!(&vault, &canvas, CANVAS_EXTENSION);
            let json = vault.read(&canvas)?;
            let mode = if append {
                WriteMode::Append
            } else {
                WriteMode::Overwrite
            };

            let outcome = sync::push(&json, &mut vault, &settings, mode)
                .with_context(|| format!("pushing {canvas}"))?;
            if let Some(report) = done(outcome) {
                println!(
                    "Wrote {} keys to {} files",
                    report.keys_written,
                    report.modified.len()
                );
                for path in &report.missing {
                    println!("skipped {path}: not in the vault");
                }
            }
        }

        Commands::Synthesize { document, force } => {
            let document = file_or_notice!(&vault, &document, MARKDOWN_EXTENSION);
            if !vault.exists(&document) {
                bail!("{document} does not exist");
            }

            if let Some(report) = done(sync::synthesize(&document, &vault, &settings)) {
                if let Some(warning) = &report.warning {
                    println!("{warning}");
                }
                if vault.exists(&report.path) && !force {
                    bail!("{} already exists (use --force to replace it)", report.path);
                }
                vault.write(&report.path, &report.canvas.to_json_pretty()?)?;
                println!("Created {}", report.path);
            }
        }

        Commands::Pull {
            canvas,
            document,
            existing_only,
        } => {
            let canvas = file_or_notice!(&vault, &canvas, CANVAS_EXTENSION);
            let document = file_or_notice!(&vault, &document, MARKDOWN_EXTENSION);
            let json = vault.read(&canvas)?;

            let outcome = sync::pull(&json, &document, &vault, &settings, existing_only)
                .with_context(|| format!("pulling {document} into {canvas}"))?;
            if let Some(report) = done(outcome) {
                vault.write(&canvas, &report.canvas.to_json_pretty()?)?;
                println!(
                    "Added {} nodes and {} edges to {canvas}",
                    report.nodes_added, report.edges_added
                );
                if report.skipped > 0 {
                    println!("{} values not on the canvas were skipped", report.skipped);
                }
            }
        }

        Commands::Affected { previous, canvas } => {
            let canvas = file_or_notice!(&vault, &canvas, CANVAS_EXTENSION);
            let before_json = std::fs::read_to_string(&previous)
                .with_context(|| format!("reading {}", previous.display()))?;
            let before = build_graph(&parse_canvas(&before_json)?)?;
            let after = build_graph(&parse_canvas(&vault.read(&canvas)?)?)?;

            let mut tracker = EdgeDeltaTracker::new();
            tracker.reset(&before);
            let delta = tracker.observe(&after);
            if delta.is_empty() {
                println!("{}", Notice::NoChanges);
                return Ok(());
            }

            let mut paths = affected_documents(&delta, &before);
            for path in affected_documents(&delta, &after) {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            for path in paths {
                println!("{path}");
            }
        }
    }

    Ok(())
}
