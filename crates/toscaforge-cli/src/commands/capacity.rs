//! `tosc capacity`: extract capacity figures from an abstract template.

use std::path::{Path, PathBuf};

use clap::Args;

use toscaforge_common::config::{ApplicationMatch, ClassifierConfig};
use toscaforge_common::error::ToscaforgeError;
use toscaforge_engine::capacity;
use toscaforge_model::document::Document;

/// Arguments for the `capacity` subcommand.
#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Path to the TOSCA template.
    pub template: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Executes the `capacity` command.
///
/// # Errors
///
/// Returns a [`ToscaforgeError::WrongOperation`] when the template is a
/// concrete assignment (capacity figures are only meaningful on abstract
/// templates) and the usual document-fatal errors otherwise.
pub fn execute(args: CapacityArgs, processor: Option<&Path>) -> anyhow::Result<()> {
    let raw = Document::from_path(&args.template)?;
    if raw.is_concrete() {
        return Err(ToscaforgeError::WrongOperation {
            message: "capacity extraction applies to abstract templates, not concrete assignments"
                .into(),
        }
        .into());
    }

    let document = super::resolve_document(&args.template, processor, None)?;
    let config = ClassifierConfig::from_env(ApplicationMatch::Substring);

    let report = capacity::extract(&document.nodes()?, &config);
    let text = serde_yaml::to_string(&report.to_value())?;
    super::write_output(args.output.as_deref(), &text)
}
