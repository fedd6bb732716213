//! Ondas CLI - render and inspect ondas graph files.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ondas")]
#[command(author, version, about = "Offline audio graph renderer", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a graph file to a WAV file
    Render(commands::render::RenderArgs),

    /// Check a graph file without rendering it
    Validate(commands::validate::ValidateArgs),

    /// List available node types and their params
    Nodes(commands::nodes::NodesArgs),

    /// Show WAV file information
    Info(commands::info::InfoArgs),
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level(cli.verbose).into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Nodes(args) => commands::nodes::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
