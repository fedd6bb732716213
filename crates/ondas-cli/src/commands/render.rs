//! Graph file rendering command.

use clap::Args;
use futures::executor::block_on;
use ondas_config::GraphConfig;
use ondas_core::AudioBuffer;
use ondas_engine::{EngineProfile, OfflineEngine};
use ondas_io::write_wav;
use std::path::PathBuf;

#[derive(Args)]
pub struct RenderArgs {
    /// Graph file (TOML)
    #[arg(value_name = "GRAPH")]
    graph: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,

    /// Engine profile, overriding the graph file
    #[arg(long)]
    profile: Option<EngineProfile>,

    /// Sample rate in Hz, overriding the graph file
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Render length in seconds, overriding the graph file
    #[arg(short, long)]
    duration: Option<f64>,

    /// Output channel count, overriding the graph file
    #[arg(long)]
    channels: Option<usize>,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    println!("Loading {}...", args.graph.display());
    let mut config = GraphConfig::load(&args.graph)?;

    if let Some(profile) = args.profile {
        config.render.profile = profile.name().to_string();
    }
    if let Some(sample_rate) = args.sample_rate {
        config.render.sample_rate = sample_rate;
    }
    if let Some(duration) = args.duration {
        config.render.duration = Some(duration);
        config.render.length = None;
    }
    if let Some(channels) = args.channels {
        config.render.channels = channels;
    }

    let options = config.render.engine_options()?;
    let built = config.build::<OfflineEngine>()?;
    println!(
        "  {}: {} node(s), {} connection(s)",
        config.name,
        config.nodes.len(),
        config.connections.len()
    );

    println!(
        "Rendering {} frames ({:.2}s) at {} Hz, {} channel(s), {} profile...",
        options.length,
        options.duration(),
        options.sample_rate,
        options.channels,
        options.profile
    );
    tracing::info!(graph = %config.name, profile = %options.profile, "render");

    let engine = OfflineEngine::new(options)?;
    let buffer = block_on(built.graph.render(engine))?;

    print_stats(&buffer);

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &buffer, args.bit_depth)?;
    println!("Done!");

    Ok(())
}

fn print_stats(buffer: &AudioBuffer) {
    println!("\nStats:");
    for (index, channel) in buffer.channels().iter().enumerate() {
        println!(
            "  Channel {}: RMS {:.1} dB, Peak {:.1} dB",
            index + 1,
            linear_to_db(rms(channel)),
            linear_to_db(peak(channel))
        );
    }
    if buffer.peak() > 1.0 {
        println!("  Warning: output exceeds 0 dBFS and will clip below 32-bit");
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        20.0 * linear.log10()
    }
}
