//! `tosc manifest`: generate Kubernetes manifests for application nodes.

use std::path::{Path, PathBuf};

use clap::Args;

use toscaforge_common::config::{ApplicationMatch, ClassifierConfig};
use toscaforge_common::constants;
use toscaforge_engine::manifest;

/// Arguments for the `manifest` subcommand.
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Path to the TOSCA template.
    pub template: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Image pull secret injected into every Deployment.
    #[arg(long, default_value = constants::DEFAULT_IMAGE_PULL_SECRET)]
    pub image_pull_secret: String,

    /// Capacity-definitions document spliced over a `substitute`
    /// placeholder before validation.
    #[arg(long)]
    pub capacity: Option<PathBuf>,
}

/// Executes the `manifest` command.
///
/// Nodes that fail individually are skipped with a logged reason; the
/// command only fails when no node produced a manifest at all.
///
/// # Errors
///
/// Returns an error when validation fails or no manifests were generated.
pub fn execute(args: ManifestArgs, processor: Option<&Path>) -> anyhow::Result<()> {
    let document = super::resolve_document(&args.template, processor, args.capacity.as_deref())?;

    let config = ClassifierConfig::from_env(ApplicationMatch::ExactSuffix);
    let manifests = manifest::project(&document.nodes()?, &config, &args.image_pull_secret);
    if manifests.is_empty() {
        anyhow::bail!("no Kubernetes manifests generated");
    }

    let mut stream = String::new();
    for (index, object) in manifests.iter().enumerate() {
        if index > 0 {
            stream.push_str("---\n");
        }
        stream.push_str(&serde_yaml::to_string(object)?);
    }

    super::write_output(args.output.as_deref(), &stream)?;
    println!("{} manifest object(s) generated", manifests.len());
    Ok(())
}
