//! Graph files for ondas.
//!
//! A graph file is a TOML document describing the nodes of an
//! [`AudioGraph`](ondas_nodes::AudioGraph), their connections and the render
//! settings:
//!
//! ```toml
//! name = "Filtered saw"
//!
//! [render]
//! sample_rate = 48000
//! duration = 2.0
//! channels = 2
//!
//! [[nodes]]
//! id = "osc"
//! type = "oscillator"
//! waveform = "sawtooth"
//! frequency = 110.0
//!
//! [[nodes]]
//! id = "lp"
//! type = "biquad-filter"
//! frequency = 900.0
//!
//! [[connections]]
//! from = "osc"
//! to = "lp"
//!
//! [[connections]]
//! from = "lp"
//! to = "destination"
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ondas_config::GraphConfig;
//! use ondas_engine::OfflineEngine;
//!
//! let config = GraphConfig::load("graph.toml").unwrap();
//! let options = config.render.engine_options().unwrap();
//! let built = config.build::<OfflineEngine>().unwrap();
//! let engine = OfflineEngine::new(options).unwrap();
//! let buffer = futures::executor::block_on(built.graph.render(engine)).unwrap();
//! ```

mod build;
mod error;
mod graph_config;

/// Graph file validation.
pub mod validation;

pub use build::BuiltGraph;
pub use error::ConfigError;
pub use graph_config::{
    ConnectionConfig, DESTINATION_ID, Endpoint, GraphConfig, NodeConfig, RenderConfig,
};
pub use validation::{ValidationError, ValidationResult, validate_graph};
