//! rolecheck - Command-line interface for role files
//!
//! Usage:
//!   rolecheck -f roles.yaml                          - Start interactive mode
//!   rolecheck -f roles.yaml check <action> <entity>  - Check a permission
//!   rolecheck -f roles.yaml roles [name]             - Show resolved roles
//!   rolecheck merge <file>...                        - Merge ability map files

use clap::{Parser, Subcommand};
use cli::commands::{load_registry, CheckCommand, MergeCommand, RolesCommand};
use cli::interactive::InteractiveCli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rolecheck")]
#[command(about = "rolecheck - Evaluate role-based access rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Role files to load (YAML or JSON), applied in order
    #[arg(short, long = "file", global = true)]
    files: Vec<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the current role(s) may perform an action
    Check(CheckCommand),
    /// Show resolved roles
    Roles(RolesCommand),
    /// Merge ability map files
    Merge(MergeCommand),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check(cmd)) => {
            if !cmd.run(&cli.files, cli.json)? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Roles(cmd)) => cmd.run(&cli.files, cli.json),
        Some(Commands::Merge(cmd)) => cmd.run(cli.json),
        None => {
            let registry = load_registry(&cli.files)?;
            let mut interactive = InteractiveCli::new(registry);
            interactive.run()
        }
    }
}
