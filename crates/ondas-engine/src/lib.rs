//! Ondas Engine - reference offline engine for ondas graphs
//!
//! [`OfflineEngine`] implements [`NativeEngine`](ondas_core::NativeEngine) and
//! [`NodeFactory`](ondas_nodes::NodeFactory), so any
//! [`AudioGraph`](ondas_nodes::AudioGraph) renders through it.
//!
//! Rendering pulls from the destination one 128-frame quantum at a time:
//!
//! - Inputs are mixed to the node's channel count (mono copies up, wider
//!   buses average down).
//! - Params are a-rate: base value plus the mono sum of connected outputs.
//! - Cycles are legal through delay nodes, which are held to at least one
//!   quantum of delay there. Cycles without a delay render silence.
//!
//! Two [`EngineProfile`]s cover both completion styles: `modern` returns a
//! completion future and creates constant sources natively, `legacy` only
//! fires the completion listener, has no constant source, and never
//! completes while nothing feeds its destination.

pub mod bus;
pub mod dsp;
mod engine;
mod network;
pub mod options;
mod processor;
mod render;
mod schedule;

pub use bus::{Bus, QUANTUM};
pub use engine::{EngineNode, OfflineEngine};
pub use options::{EngineOptions, EngineProfile};
