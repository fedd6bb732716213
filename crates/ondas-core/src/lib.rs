//! Ondas Core - proxy audio graphs rendered offline into native engines
//!
//! Users assemble a graph of proxy nodes before any engine exists, edit it
//! freely, and render it as many times as they like. Each render mirrors the
//! graph into a fresh native offline engine, which performs the DSP and
//! returns a buffer of samples.
//!
//! # Core Abstractions
//!
//! ## Wiring Model
//!
//! - [`ProxyGraph`] - Pure topology: proxy nodes and insertion-ordered
//!   [`WiringRecord`]s
//! - [`NodeId`], [`Target`] - Arena handles and connection endpoints
//!
//! ## Rendering
//!
//! - [`NodeRenderer`] - Turns one proxy node into one native node
//! - [`RenderSession`] - Walks the graph from a destination, instantiating
//!   each node at most once and breaking feedback loops
//! - [`render_to_completion`] - Starts the engine and waits for its buffer,
//!   whichever completion style the engine uses
//! - [`render_offline`] - All of the above in one call
//!
//! ## Environment
//!
//! - [`NativeEngine`] - The contract a native offline engine implements
//! - [`CapabilityCache`] - Memoized, concurrency-safe capability probes
//!
//! # Execution Model
//!
//! Rendering is single-threaded and cooperative. Futures returned here are
//! `!Send` local futures; drive them with any local executor, e.g.
//! `futures::executor::block_on`.
//!
//! # Example
//!
//! ```rust,ignore
//! use ondas_core::{CapabilityCache, ProxyGraph, Target, render_offline};
//!
//! let graph = ProxyGraph::new().into_shared();
//! let osc = graph.borrow_mut().add_node("oscillator", NodeShape::new(0, 1), osc_renderer);
//! let out = graph.borrow_mut().add_node("destination", NodeShape::new(1, 0), dest_renderer);
//! graph.borrow_mut().wire(osc, 0, Target::node(out))?;
//!
//! let buffer = futures::executor::block_on(
//!     render_offline(&graph, out, engine, CapabilityCache::global()),
//! )?;
//! ```

pub mod buffer;
pub mod capability;
pub mod error;
pub mod graph;
pub mod native;
pub mod render;

pub use buffer::AudioBuffer;
pub use capability::{CapabilityCache, CapabilityKey, Probe, ProbeError, ProbeResult, SharedProbe};
pub use error::{EngineError, GraphError, RenderError};
pub use graph::{EdgeId, NodeId, NodeShape, ProxyGraph, SharedGraph, Target, WiringRecord};
pub use native::{CompletionFuture, CompletionListener, NativeEngine};
pub use render::{
    FUTURE_COMPLETION, NodeRenderer, RenderHandle, RenderRequest, RenderSession, Rendered,
    RenderedInput, render_offline, render_to_completion, supports_future_completion,
};
