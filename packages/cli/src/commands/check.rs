use crate::config::Config;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{check_stored, GateIssue, GateReport, Validator};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Template file or directory (defaults to the configured templates directory)
    pub input: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Fail on validation errors too, not only on publish blockers
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    #[serde(flatten)]
    report: GateReport,
}

pub fn check(args: CheckArgs, config: &Config, cwd: &str) -> Result<()> {
    if !matches!(args.format.as_str(), "text" | "json") {
        bail!("Invalid format: {}. Use: text or json", args.format);
    }
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.get_templates_dir(cwd));
    let strict = args.strict || config.strict;
    let text = args.format == "text";

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_json_files(&input)
    } else {
        bail!("Input path does not exist: {}", input.display());
    };

    if text {
        println!("🔍 {} Pagecraft check", "Starting".green().bold());
        println!("   Input: {}", input.display());
        println!("   Found {} template files", files.len());
        println!();
    }

    let validator = Validator::new();
    let mut reports = Vec::new();
    for file in &files {
        let report = check_file(file, &validator)?;
        tracing::debug!(
            "{}: {} blocking, {} validation",
            file.display(),
            report.hard.len(),
            report.soft.len()
        );
        if text {
            print_report(file, &report);
        }
        reports.push(FileReport {
            file: file.display().to_string(),
            report,
        });
    }

    if !text {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    let hard: usize = reports.iter().map(|r| r.report.hard.len()).sum();
    let soft: usize = reports.iter().map(|r| r.report.soft.len()).sum();
    let failed = reports
        .iter()
        .filter(|r| r.report.is_blocking() || (strict && !r.report.soft.is_empty()))
        .count();

    if text {
        println!(
            "✨ {} Check complete!",
            if failed > 0 {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            }
        );
        println!("   Files checked: {}", reports.len());
        if hard > 0 {
            println!("   {} {}", "Blocking:".red(), hard);
        }
        if soft > 0 {
            println!("   {} {}", "Validation:".yellow(), soft);
        }
        if hard == 0 && soft == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if failed > 0 {
        bail!("{} of {} template file(s) failed checks", failed, reports.len());
    }
    Ok(())
}

/// Gate one stored template file; unreadable JSON is a blocking issue
pub fn check_file(path: &Path, validator: &Validator) -> Result<GateReport> {
    let source = fs::read_to_string(path)?;
    let report = match serde_json::from_str(&source) {
        Ok(value) => check_stored(&value, validator),
        Err(err) => GateReport {
            hard: vec![GateIssue::Malformed {
                message: err.to_string(),
            }],
            soft: Vec::new(),
        },
    };
    Ok(report)
}

fn print_report(file: &Path, report: &GateReport) {
    if report.is_clean() {
        println!("{} {}", "✓".green(), file.display());
        return;
    }

    println!("{}", file.display());
    for issue in &report.hard {
        println!("  {} {}", "blocked".red().bold(), issue);
    }
    for error in &report.soft {
        let field = error.field.as_deref().unwrap_or("-");
        println!(
            "  {} [{} {}] {}",
            "invalid".yellow().bold(),
            error.block_id,
            field,
            error.message
        );
        if let Some(suggestion) = &error.suggestion {
            println!("    {} autofix: {}", "💡".dimmed(), suggestion.to_string().dimmed());
        }
    }
    println!();
}

pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_malformed_json_is_blocking() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.json", "{ \"id\": ");
        let report = check_file(&path, &Validator::new()).unwrap();
        assert!(matches!(report.hard[0], GateIssue::Malformed { .. }));
    }

    #[test]
    fn test_soft_errors_fail_only_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "site.json",
            r#"{ "id": "t", "data": { "pages": [{ "id": "p", "slug": "home", "blocks": [
                { "id": "b", "type": "text", "content": { "body": "" } }
            ] }] } }"#,
        );
        let cwd = dir.path().to_string_lossy().to_string();
        let args = |strict| CheckArgs {
            input: Some(dir.path().to_path_buf()),
            format: "json".into(),
            strict,
        };

        assert!(check(args(false), &Config::default(), &cwd).is_ok());
        assert!(check(args(true), &Config::default(), &cwd).is_err());
    }

    #[test]
    fn test_find_json_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        write(dir.path(), "a.json", "{}");
        write(&dir.path().join("nested"), "b.json", "{}");
        write(dir.path(), "notes.txt", "");
        assert_eq!(find_json_files(dir.path()).len(), 2);
    }
}
