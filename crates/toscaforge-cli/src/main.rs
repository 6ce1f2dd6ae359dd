//! # tosc, the Toscaforge CLI
//!
//! Processes TOSCA service templates into Kubernetes manifests and
//! provider-specific resource-ask descriptors.

mod commands;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
