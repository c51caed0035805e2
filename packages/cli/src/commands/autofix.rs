use super::normalize::{emit, read_template};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Mutation, TemplateDocument};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AutofixArgs {
    /// Stored template file
    pub file: PathBuf,

    /// Rewrite the file in place instead of printing
    #[arg(short, long)]
    pub write: bool,
}

pub fn autofix(args: AutofixArgs) -> Result<()> {
    let mut document = TemplateDocument::new(read_template(&args.file)?);
    let before = document.validation_report();

    let roots: Vec<String> = document.draft().root_blocks().map(|b| b.id.clone()).collect();
    for block_id in roots {
        document.apply(&Mutation::AutofixBlock { block_id })?;
    }

    let after = document.validation_report();
    let fixed = before.len().saturating_sub(after.len());
    tracing::info!("{}: fixed {} of {} errors", args.file.display(), fixed, before.len());

    // Report on stderr so printed JSON stays parseable
    eprintln!("{} Fixed {} field(s)", "✓".green(), fixed);
    for error in &after.errors {
        eprintln!(
            "  {} [{} {}] {}",
            "remaining".yellow().bold(),
            error.block_id,
            error.field.as_deref().unwrap_or("-"),
            error.message
        );
    }

    emit(&args.file, document.draft(), args.write, "Autofixed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_autofix_writes_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        fs::write(
            &path,
            r#"{ "id": "t", "data": { "pages": [{ "id": "p", "slug": "home", "blocks": [
                { "id": "hero-1", "type": "hero", "content": { "subheadline": "Since 1998" } }
            ] }] } }"#,
        )
        .unwrap();

        autofix(AutofixArgs {
            file: path.clone(),
            write: true,
        })
        .unwrap();

        let out: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let hero = &out["data"]["pages"][0]["blocks"][0];
        assert_eq!(hero["content"]["headline"], "Welcome");
        assert_eq!(hero["content"]["subheadline"], "Since 1998");
    }
}
