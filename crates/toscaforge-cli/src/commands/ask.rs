//! `tosc ask`: extract node-filter constraints into an ask document.

use std::path::PathBuf;

use clap::Args;

use toscaforge_engine::ask;
use toscaforge_model::document::Document;

/// Arguments for the `ask` subcommand.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Path to the raw TOSCA template.
    pub template: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the template's QoS policies instead of the ask document.
    #[arg(long)]
    pub policies: bool,
}

/// Executes the `ask` command.
///
/// Operates on the raw (unresolved) template; node filters are authored
/// constructs that the processor would otherwise resolve away.
///
/// # Errors
///
/// Returns an error when the template cannot be read or no node carries a
/// `node_filter`.
pub fn execute(args: AskArgs) -> anyhow::Result<()> {
    let document = Document::from_path(&args.template)?;

    if args.policies {
        let text = serde_yaml::to_string(document.policies())?;
        return super::write_output(args.output.as_deref(), &text);
    }

    let ask = ask::build(&document)?;
    tracing::info!(nodes = ask.len(), "extracted resource requirements");
    let text = serde_yaml::to_string(&ask)?;
    super::write_output(args.output.as_deref(), &text)
}
