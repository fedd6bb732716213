//! Graph file validation command.

use clap::Args;
use ondas_config::GraphConfig;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// Graph file (TOML)
    #[arg(value_name = "GRAPH")]
    graph: PathBuf,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = GraphConfig::load(&args.graph)?;

    match config.validate() {
        Ok(()) => {
            let options = config.render.engine_options()?;
            println!("{}: OK", args.graph.display());
            println!(
                "  {} node(s), {} connection(s)",
                config.nodes.len(),
                config.connections.len()
            );
            println!(
                "  {} frames at {} Hz, {} channel(s), {} profile",
                options.length, options.sample_rate, options.channels, options.profile
            );
            Ok(())
        }
        Err(error) => {
            let errors = error.into_errors();
            println!("{}: {} error(s)", args.graph.display(), errors.len());
            for error in &errors {
                println!("  - {error}");
            }
            anyhow::bail!("{} is not a valid graph file", args.graph.display())
        }
    }
}
