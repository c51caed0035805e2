use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Templates directory
    #[arg(short, long, default_value = "templates")]
    pub templates_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagecraft project...".bright_blue().bold());

    // Create templates directory if it doesn't exist
    let templates_dir = PathBuf::from(cwd).join(&args.templates_dir);
    if !templates_dir.exists() {
        fs::create_dir_all(&templates_dir)?;
        println!("  {} Created {}/", "✓".green(), args.templates_dir);
    }

    // Create example template
    let example_file = templates_dir.join("example.json");
    if !example_file.exists() {
        let example = json!({
            "id": "example",
            "revision": 0,
            "slug": "example",
            "name": "Example Bakery",
            "data": {
                "pages": [{
                    "id": "home",
                    "slug": "home",
                    "title": "Home",
                    "blocks": [
                        { "id": "hero-1", "type": "hero", "content": {
                            "headline": "Fresh bread daily",
                            "ctaLabel": "Visit us",
                            "ctaHref": "/contact"
                        } },
                        { "id": "text-1", "type": "text", "content": {
                            "body": "Baked every morning since 1998."
                        } }
                    ]
                }]
            }
        });
        fs::write(&example_file, serde_json::to_string_pretty(&example)?)?;
        println!("  {} Created example.json", "✓".green());
    }

    // Create config
    let config = Config {
        templates_dir: args.templates_dir.clone(),
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/example.json", args.templates_dir);
    println!("  2. Run: pagecraft check");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_config_and_example() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_string_lossy().to_string();

        init(
            InitArgs {
                templates_dir: "sites".into(),
                force: false,
            },
            &cwd,
        )
        .unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.templates_dir, "sites");
        assert!(dir.path().join("sites/example.json").exists());
    }
}
