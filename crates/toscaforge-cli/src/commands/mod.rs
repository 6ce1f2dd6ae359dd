//! CLI command definitions and dispatch.

pub mod ask;
pub mod capacity;
pub mod cluster;
pub mod manifest;
pub mod splice;
pub mod validate;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use toscaforge_engine::validator::{PucciniValidator, TemplateValidator};
use toscaforge_model::document::Document;

/// Toscaforge, a TOSCA template processor and artifact generator.
#[derive(Parser, Debug)]
#[command(name = "tosc", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the external TOSCA processor binary (default: `puccini-tosca`
    /// on $PATH).
    #[arg(long, global = true)]
    pub processor: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a batch of templates and print a pass/fail summary.
    Validate(validate::ValidateArgs),
    /// Extract node-filter constraints into an ask YAML document.
    Ask(ask::AskArgs),
    /// Project resource nodes into flattened provider asks (JSON).
    Cluster(cluster::ClusterArgs),
    /// Extract overall or per-node capacity figures.
    Capacity(capacity::CapacityArgs),
    /// Generate Kubernetes Deployment/Service manifests.
    Manifest(manifest::ManifestArgs),
    /// Splice concrete capacity nodes over a placeholder, in place.
    Splice(splice::SpliceArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let processor = cli.processor;
    match cli.command {
        Command::Validate(args) => validate::execute(args, processor.as_deref()),
        Command::Ask(args) => ask::execute(args),
        Command::Cluster(args) => cluster::execute(args, processor.as_deref()),
        Command::Capacity(args) => capacity::execute(args, processor.as_deref()),
        Command::Manifest(args) => manifest::execute(args, processor.as_deref()),
        Command::Splice(args) => splice::execute(args),
    }
}

/// Builds the validator from the `--processor` override or `$PATH`.
fn validator(processor: Option<&Path>) -> anyhow::Result<PucciniValidator> {
    Ok(match processor {
        Some(path) => PucciniValidator::new(path.to_path_buf()),
        None => PucciniValidator::locate()?,
    })
}

/// Validates a template and parses the processor's resolved output.
///
/// When `capacity` is given and the template still carries a `substitute`
/// placeholder, the capacity nodes are spliced in place before validation.
fn resolve_document(
    path: &Path,
    processor: Option<&Path>,
    capacity: Option<&Path>,
) -> anyhow::Result<Document> {
    if !path.exists() {
        anyhow::bail!("file not found: {}", path.display());
    }
    if let Some(capacity_path) = capacity {
        if toscaforge_engine::splice::has_placeholder(path)? {
            let inserted = toscaforge_engine::splice::splice_capacity(path, capacity_path)?;
            tracing::info!(nodes = inserted, "spliced capacity nodes before validation");
        }
    }
    let resolved = validator(processor)?.validate_and_resolve(path)?;
    Ok(Document::from_str(&resolved)?)
}

/// Writes `text` to the output file, or stdout when none is given.
fn write_output(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    if let Some(path) = output {
        std::fs::write(path, text)?;
        println!("Written to {}", path.display());
    } else {
        print!("{text}");
    }
    Ok(())
}
