//! `tosc splice`: replace a placeholder node with concrete capacity nodes.

use std::path::PathBuf;

use clap::Args;

use toscaforge_engine::splice;

/// Arguments for the `splice` subcommand.
#[derive(Args, Debug)]
pub struct SpliceArgs {
    /// Path to the TOSCA template (rewritten in place).
    pub template: PathBuf,

    /// Capacity-definitions document providing the concrete nodes.
    #[arg(long)]
    pub capacity: PathBuf,
}

/// Executes the `splice` command.
///
/// # Errors
///
/// Returns an error when either document is unreadable or the template has
/// no substitutable placeholder.
pub fn execute(args: SpliceArgs) -> anyhow::Result<()> {
    let count = splice::splice_capacity(&args.template, &args.capacity)?;
    println!(
        "Spliced {count} node template(s) into {}",
        args.template.display()
    );
    Ok(())
}
