use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_blocks::{create_default, BlockRegistry};

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Block type to describe; lists every type when omitted
    pub kind: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn schema(args: SchemaArgs) -> Result<()> {
    let registry = BlockRegistry::new();

    let Some(name) = args.kind else {
        if args.json {
            let schemas: Vec<_> = registry.kinds().iter().map(|k| registry.schema_for(*k)).collect();
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        } else {
            println!("{}", "Block types".bright_blue().bold());
            for kind in registry.kinds() {
                let schema = registry.schema_for(*kind);
                println!("  {} ({} fields)", kind.to_string().bright_white(), schema.fields.len());
            }
        }
        return Ok(());
    };

    let kind = registry
        .parse_kind(&name)
        .map_err(|err| anyhow!("{}. Run `pagecraft schema` for the list", err))?;
    let schema = registry.schema_for(kind);

    if args.json {
        let described = serde_json::json!({
            "schema": schema,
            "default": create_default(kind),
        });
        println!("{}", serde_json::to_string_pretty(&described)?);
        return Ok(());
    }

    println!("{}", kind.to_string().bright_blue().bold());
    for field in schema.fields {
        let mut line = format!("  {} {:?}", field.name.bright_white(), field.ty);
        if field.required {
            line.push_str(&format!(" {}", "required".red()));
        }
        if let Some(fallback) = field.fallback {
            line.push_str(&format!(" (fallback {:?})", fallback));
        }
        println!("{}", line);
        if !field.aliases.is_empty() {
            println!("    {} {}", "aliases:".dimmed(), field.aliases.join(", ").dimmed());
        }
    }
    Ok(())
}
