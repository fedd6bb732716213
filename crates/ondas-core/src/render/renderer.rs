//! Per-node renderer contract.
//!
//! Every proxy node carries a [`NodeRenderer`] that knows how to turn it into
//! exactly one native node. The render session calls
//! [`render()`](NodeRenderer::render) at most once per node per pass, after
//! every non-feedback upstream dependency has a native node, then connects the
//! upstream natives through [`wire()`](NodeRenderer::wire).

use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::capability::CapabilityCache;
use crate::error::EngineError;
use crate::graph::{NodeId, Target, WiringRecord};
use crate::native::NativeEngine;

/// A resolved upstream connection handed to a renderer.
#[derive(Clone, Debug)]
pub struct RenderedInput<N> {
    /// The wiring record this input was resolved from.
    pub record: WiringRecord,
    /// The upstream node's native counterpart.
    pub native: N,
}

/// Everything a renderer may look at while instantiating its node.
pub struct RenderRequest<'a, E: NativeEngine> {
    /// The proxy node being rendered.
    pub node: NodeId,
    /// The node's type label.
    pub kind: &'static str,
    /// Resolved upstream natives, in wiring insertion order. Feedback edges
    /// are absent; they are connected after the upstream node exists.
    pub inputs: &'a [RenderedInput<E::Node>],
    /// The engine to create the native node on.
    pub engine: &'a Rc<E>,
    /// Capability answers for this engine's flavor.
    pub capabilities: &'a CapabilityCache,
}

/// Outcome of a renderer invocation.
pub enum Rendered<N> {
    /// The native node was created synchronously.
    Ready(N),
    /// The native node will be available once the future resolves.
    Pending(LocalBoxFuture<'static, Result<N, EngineError>>),
}

impl<N> Rendered<N> {
    /// Resolves to the native node.
    pub async fn into_native(self) -> Result<N, EngineError> {
        match self {
            Self::Ready(native) => Ok(native),
            Self::Pending(future) => future.await,
        }
    }
}

impl<N> From<N> for Rendered<N> {
    fn from(native: N) -> Self {
        Self::Ready(native)
    }
}

/// Instantiates native nodes for one proxy node type.
///
/// Implementations must not mutate the proxy graph.
pub trait NodeRenderer<E: NativeEngine> {
    /// Creates the native node for `request.node`.
    fn render(&self, request: RenderRequest<'_, E>) -> Result<Rendered<E::Node>, EngineError>;

    /// Connects `upstream` to `native`, the node this renderer created, as
    /// described by `record`.
    ///
    /// Override when the native node does not expose the proxy node's
    /// endpoints one-to-one (for example a param implemented by a differently
    /// named native param). `capabilities` holds the answers `render` saw.
    fn wire(
        &self,
        engine: &E,
        _capabilities: &CapabilityCache,
        upstream: &E::Node,
        record: &WiringRecord,
        native: &E::Node,
    ) -> Result<(), EngineError> {
        match record.target {
            Target::Input { input, .. } => engine.connect(upstream, record.output, native, input),
            Target::Param { param, .. } => {
                engine.connect_param(upstream, record.output, native, param)
            }
        }
    }
}

impl<E, F> NodeRenderer<E> for F
where
    E: NativeEngine,
    F: Fn(RenderRequest<'_, E>) -> Result<Rendered<E::Node>, EngineError>,
{
    fn render(&self, request: RenderRequest<'_, E>) -> Result<Rendered<E::Node>, EngineError> {
        self(request)
    }
}
