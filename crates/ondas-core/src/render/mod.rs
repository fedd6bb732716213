//! Rendering a proxy graph into a native engine.
//!
//! - [`renderer`]: the per-node contract ([`NodeRenderer`])
//! - [`session`]: the graph walk ([`RenderSession`])
//! - [`completion`]: starting the engine and waiting for its buffer
//!
//! [`render_offline()`] strings the three together.

pub mod completion;
pub mod renderer;
pub mod session;

use std::rc::Rc;

pub use completion::{FUTURE_COMPLETION, render_to_completion, supports_future_completion};
pub use renderer::{NodeRenderer, RenderRequest, Rendered, RenderedInput};
pub use session::{RenderHandle, RenderSession};

use crate::buffer::AudioBuffer;
use crate::capability::CapabilityCache;
use crate::error::RenderError;
use crate::graph::{NodeId, SharedGraph};
use crate::native::NativeEngine;

/// Mirrors everything upstream of `destination` into `engine`, renders it,
/// and returns the rendered buffer.
///
/// `destination` is usually the proxy node that stands for the engine's own
/// destination. Each call uses a fresh session, so edits made to `graph`
/// between calls are picked up by the next render.
pub async fn render_offline<E: NativeEngine>(
    graph: &SharedGraph<E>,
    destination: NodeId,
    engine: E,
    capabilities: &CapabilityCache,
) -> Result<AudioBuffer, RenderError> {
    let engine = Rc::new(engine);
    let session = RenderSession::new(Rc::clone(graph), Rc::clone(&engine), capabilities.clone());
    session.render(destination).await?;
    render_to_completion(&engine, capabilities).await
}
