//! Proxy graph wiring model.
//!
//! Users assemble a graph of proxy nodes before any native engine exists. The
//! graph stores topology only:
//!
//! - [`NodeId`] - arena handle of a proxy node (identity is the index)
//! - [`NodeShape`] - input/output counts and connectable param names
//! - [`WiringRecord`] - `source[output] → target`, where the [`Target`] is a
//!   node input or a named param
//!
//! Duplicate records are legal and additive (parallel paths sum). Records into a
//! node are kept in insertion order because native wiring order follows it.
//!
//! # Example
//!
//! ```rust,ignore
//! use ondas_core::graph::{ProxyGraph, NodeShape, Target};
//!
//! let mut graph = ProxyGraph::new();
//! let osc = graph.add_node("oscillator", NodeShape::new(0, 1), osc_renderer);
//! let gain = graph.add_node("gain", NodeShape::new(1, 1).with_params(&["gain"]), gain_renderer);
//! graph.wire(osc, 0, Target::node(gain))?;
//! graph.wire(lfo, 0, Target::Param { node: gain, param: "gain" })?;
//! ```

pub mod edge;
pub mod node;
pub mod proxy;

pub use edge::{EdgeId, Target, WiringRecord};
pub use node::{NodeId, NodeShape};
pub use proxy::{ProxyGraph, SharedGraph};
