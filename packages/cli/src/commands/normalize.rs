use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::Template;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Stored template file
    pub file: PathBuf,

    /// Rewrite the file in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

pub fn normalize(args: NormalizeArgs) -> Result<()> {
    let template = read_template(&args.file)?;
    tracing::debug!(
        "{}: {} pages, {} blocks",
        args.file.display(),
        template.pages.len(),
        template.block_ids().len()
    );
    emit(&args.file, &template, args.write, "Normalized")
}

/// Parse a stored template, canonicalizing blocks, identity and mirrors
pub fn read_template(path: &Path) -> Result<Template> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let stored: serde_json::Value =
        serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {}", path.display()))?;
    let template = Template::from_stored(&stored)
        .with_context(|| format!("Invalid template in {}", path.display()))?;
    Ok(template)
}

/// Print the stored projection, or write it back to `path`
pub fn emit(path: &Path, template: &Template, write: bool, verb: &str) -> Result<()> {
    let json = serde_json::to_string_pretty(&template.to_stored()?)?;
    if write {
        fs::write(path, json + "\n")?;
        println!("{} {} {}", "✓".green(), verb, path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}
