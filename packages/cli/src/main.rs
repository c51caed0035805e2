mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    autofix, check, init, normalize, schema, AutofixArgs, CheckArgs, InitArgs, NormalizeArgs, SchemaArgs,
};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Pagecraft CLI - Check and repair site template documents
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log protocol steps (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagecraft project
    Init(InitArgs),

    /// Run the publish gate over template files
    Check(CheckArgs),

    /// Rewrite a template in canonical form
    Normalize(NormalizeArgs),

    /// Write safe defaults into fixable fields
    Autofix(AutofixArgs),

    /// Describe block types
    Schema(SchemaArgs),
}

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();
    let config = Config::load(&cwd)?;

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    init_tracing(level);

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Check(args) => check(args, &config, &cwd),
        Command::Normalize(args) => normalize(args),
        Command::Autofix(args) => autofix(args),
        Command::Schema(args) => schema(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
