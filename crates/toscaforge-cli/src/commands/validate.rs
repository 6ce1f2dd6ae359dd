//! `tosc validate`: validate a batch of templates.

use std::path::{Path, PathBuf};

use clap::Args;

use toscaforge_engine::validator::TemplateValidator;

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Template files or directories (searched recursively for *.yaml).
    #[arg(default_value = "templates")]
    pub paths: Vec<PathBuf>,
}

/// Executes the `validate` command.
///
/// Every file is validated independently; one failure never aborts the
/// batch. The process exits nonzero when any file failed.
///
/// # Errors
///
/// Returns an error when the processor is missing, no templates are found,
/// or any template fails validation.
pub fn execute(args: ValidateArgs, processor: Option<&Path>) -> anyhow::Result<()> {
    let validator = super::validator(processor)?;

    let mut files = Vec::new();
    for path in &args.paths {
        collect_yaml(path, &mut files)?;
    }
    if files.is_empty() {
        anyhow::bail!("no YAML templates found");
    }

    let mut success = 0usize;
    let mut failed = 0usize;
    for file in &files {
        match validator.validate_and_resolve(file) {
            Ok(_) => {
                println!("Processed successfully: {}", file.display());
                success += 1;
            }
            Err(error) => {
                println!("Failed to process: {}", file.display());
                println!("==== Error Output ====");
                println!("{error}");
                println!("======================");
                failed += 1;
            }
        }
    }

    println!("============================");
    println!("{success} Successful");
    println!("{failed} Failed");
    println!("============================");

    if failed > 0 {
        anyhow::bail!("{failed} template(s) failed validation");
    }
    Ok(())
}

/// Collects `*.yaml` files, walking directories recursively.
fn collect_yaml(path: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    if path.is_dir() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .collect();
        entries.sort();
        for entry in entries {
            collect_yaml(&entry, files)?;
        }
    } else if path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml") {
        files.push(path.to_path_buf());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_yaml_walks_directories_recursively() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("profiles");
        std::fs::create_dir(&nested).expect("mkdir");
        std::fs::write(dir.path().join("a.yaml"), "x: 1").expect("write");
        std::fs::write(nested.join("b.yml"), "y: 2").expect("write");
        std::fs::write(dir.path().join("notes.txt"), "skip me").expect("write");

        let mut files = Vec::new();
        collect_yaml(dir.path(), &mut files).expect("collect");
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| {
            f.extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        }));
    }
}
