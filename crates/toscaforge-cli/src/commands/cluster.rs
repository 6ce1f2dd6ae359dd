//! `tosc cluster`: project resource nodes into flattened provider asks.

use std::path::{Path, PathBuf};

use clap::Args;

use toscaforge_common::config::{ApplicationMatch, ClassifierConfig};
use toscaforge_engine::cluster;

/// Arguments for the `cluster` subcommand.
#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Path to the TOSCA template.
    pub template: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Capacity-definitions document spliced over a `substitute`
    /// placeholder before validation.
    #[arg(long)]
    pub capacity: Option<PathBuf>,
}

/// Executes the `cluster` command.
///
/// # Errors
///
/// Returns an error when validation fails or the document has no node
/// templates.
pub fn execute(args: ClusterArgs, processor: Option<&Path>) -> anyhow::Result<()> {
    let document = super::resolve_document(&args.template, processor, args.capacity.as_deref())?;
    let config = ClassifierConfig::from_env(ApplicationMatch::Substring);

    let projected = cluster::project(&document.nodes()?, &config);
    tracing::info!(nodes = projected.len(), "projected resource asks");

    let text = serde_json::to_string_pretty(&projected)?;
    super::write_output(args.output.as_deref(), &text)
}
