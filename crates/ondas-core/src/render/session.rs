//! Graph render coordinator.
//!
//! A [`RenderSession`] mirrors a proxy graph into one native engine instance.
//! It walks the graph upstream from a destination, instantiates each proxy node
//! at most once, and wires the resulting native nodes in record insertion
//! order.
//!
//! # Per-node state machine
//!
//! ```text
//! render_node(n) ──► entry exists? ──yes──► return cached handle
//!                        │ no
//!                        ▼
//!                 snapshot records_into(n)
//!                        │
//!        for each record, in insertion order:
//!          source already waits on n?  ──yes──► defer as feedback edge
//!                        │ no
//!                        ▼
//!          mark n waiting on source, await render_node(source)
//!                        │
//!                        ▼
//!                 renderer.render(...)
//!                        │
//!                        ▼
//!          wire resolved inputs, then feedback edges out of n
//!                        │
//!                        ▼
//!                 handle resolves to n's native node
//! ```
//!
//! The session keeps a wait-for map: each node resolving its dependencies
//! points at the one upstream node it is awaiting. Following that map from a
//! source and arriving back at `n` means the source is (directly or
//! transitively) waiting on `n`, so awaiting it would never finish. Only
//! then is the edge deferred and wired once the source has a native node of
//! its own. A source that is merely slow, for example one being resolved by
//! another pass on the same session, is awaited like any other. The map never
//! gains an edge that closes a loop, so following it always terminates.
//!
//! If a node fails, every node that deferred a feedback edge from it has its
//! cache entry replaced with the same error.
//!
//! Cache entries are [`Shared`] futures: every caller awaiting a node,
//! including a second render request for an already rendered node, gets the
//! same native node or the same error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::capability::CapabilityCache;
use crate::error::RenderError;
use crate::graph::{NodeId, SharedGraph, WiringRecord};
use crate::native::NativeEngine;

use super::renderer::{NodeRenderer, RenderRequest, RenderedInput};

/// Handle to a node's render cache entry.
pub type RenderHandle<N> = Shared<LocalBoxFuture<'static, Result<N, RenderError>>>;

/// A feedback edge waiting for its source node to be instantiated.
struct DeferredEdge<E: NativeEngine> {
    record: WiringRecord,
    native: E::Node,
    renderer: Rc<dyn NodeRenderer<E>>,
}

/// Upstream nodes of one node, split into awaited inputs and feedback edges.
struct Dependencies<N> {
    inputs: Vec<RenderedInput<N>>,
    deferred: Vec<WiringRecord>,
}

/// One render pass context: a proxy graph mirrored into one native engine.
///
/// The render cache belongs to the session, and the session owns exactly one
/// engine, so entries are keyed by node alone. Rendering the same graph into
/// a fresh engine takes a fresh session.
pub struct RenderSession<E: NativeEngine> {
    graph: SharedGraph<E>,
    engine: Rc<E>,
    capabilities: CapabilityCache,
    entries: RefCell<HashMap<NodeId, RenderHandle<E::Node>>>,
    /// Node to the upstream node it is currently awaiting.
    waiting: RefCell<HashMap<NodeId, NodeId>>,
    feedback: RefCell<HashMap<NodeId, Vec<DeferredEdge<E>>>>,
}

impl<E: NativeEngine> RenderSession<E> {
    /// Creates a session rendering `graph` into `engine`.
    pub fn new(graph: SharedGraph<E>, engine: Rc<E>, capabilities: CapabilityCache) -> Rc<Self> {
        Rc::new(Self {
            graph,
            engine,
            capabilities,
            entries: RefCell::new(HashMap::new()),
            waiting: RefCell::new(HashMap::new()),
            feedback: RefCell::new(HashMap::new()),
        })
    }

    /// The engine this session renders into.
    pub fn engine(&self) -> &Rc<E> {
        &self.engine
    }

    /// The capability cache renderers consult.
    pub fn capabilities(&self) -> &CapabilityCache {
        &self.capabilities
    }

    /// Returns the render cache entry for `node`, creating it on first visit.
    ///
    /// The returned handle is lazy: the node is resolved when the handle is
    /// first polled. Every later call returns a clone of the same handle.
    pub fn render_node(self: &Rc<Self>, node: NodeId) -> RenderHandle<E::Node> {
        if let Some(handle) = self.entries.borrow().get(&node) {
            return handle.clone();
        }

        let weak: Weak<Self> = Rc::downgrade(self);
        let handle = async move {
            let session = weak.upgrade().ok_or(RenderError::SessionClosed)?;
            session.resolve(node).await
        }
        .boxed_local()
        .shared();

        self.entries.borrow_mut().insert(node, handle.clone());
        handle
    }

    /// Renders everything upstream of `destination` and returns its native
    /// node.
    pub async fn render(self: &Rc<Self>, destination: NodeId) -> Result<E::Node, RenderError> {
        #[cfg(feature = "tracing")]
        tracing::debug!("render_pass: start at {destination}");
        let result = self.render_node(destination).await;
        #[cfg(feature = "tracing")]
        match &result {
            Ok(_) => tracing::debug!(
                "render_pass: {destination} done, {} nodes instantiated",
                self.rendered_count()
            ),
            Err(e) => tracing::debug!("render_pass: {destination} failed: {e}"),
        }
        result
    }

    /// The native node of `node`, if it has already been instantiated.
    pub fn native(&self, node: NodeId) -> Option<E::Node> {
        let entries = self.entries.borrow();
        let handle = entries.get(&node)?;
        match handle.peek() {
            Some(Ok(native)) => Some(native.clone()),
            _ => None,
        }
    }

    /// Returns true if `node` has a cache entry in this session.
    pub fn is_visited(&self, node: NodeId) -> bool {
        self.entries.borrow().contains_key(&node)
    }

    /// Number of nodes successfully instantiated so far.
    pub fn rendered_count(&self) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|handle| matches!(handle.peek(), Some(Ok(_))))
            .count()
    }

    async fn resolve(self: Rc<Self>, node: NodeId) -> Result<E::Node, RenderError> {
        let result = self.instantiate(node).await;
        if let Err(error) = &result {
            self.fail_feedback(node, error);
        }
        result
    }

    async fn instantiate(self: &Rc<Self>, node: NodeId) -> Result<E::Node, RenderError> {
        let (renderer, kind, records) = {
            let graph = self.graph.borrow();
            let renderer = graph
                .renderer(node)
                .ok_or(RenderError::MissingRenderer(node))?;
            let kind = graph.label(node).unwrap_or("unknown");
            (renderer, kind, graph.records_into(node))
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("render_visit: {kind} {node}, {} inputs", records.len());

        let Dependencies { inputs, deferred } = self.resolve_dependencies(node, records).await?;

        let rendered = renderer
            .render(RenderRequest {
                node,
                kind,
                inputs: &inputs,
                engine: &self.engine,
                capabilities: &self.capabilities,
            })
            .map_err(|source| RenderError::Instantiation { node, kind, source })?;
        let native = rendered
            .into_native()
            .await
            .map_err(|source| RenderError::Instantiation { node, kind, source })?;

        #[cfg(feature = "tracing")]
        tracing::debug!("render_instantiate: {kind} {node} -> {native:?}");

        for input in &inputs {
            self.wire(renderer.as_ref(), &input.native, &input.record, &native)?;
        }

        // Own feedback edges first so that a self-loop is wired below.
        if !deferred.is_empty() {
            let mut feedback = self.feedback.borrow_mut();
            for record in deferred {
                feedback.entry(record.source).or_default().push(DeferredEdge {
                    record,
                    native: native.clone(),
                    renderer: Rc::clone(&renderer),
                });
            }
        }

        let waiting = self.feedback.borrow_mut().remove(&node).unwrap_or_default();
        for edge in waiting {
            #[cfg(feature = "tracing")]
            tracing::debug!("render_feedback: wiring {}", edge.record);
            self.wire(edge.renderer.as_ref(), &native, &edge.record, &edge.native)?;
        }

        Ok(native)
    }

    /// Awaits the upstream sources of `records` in insertion order.
    ///
    /// Sources that already wait on `node` are returned as deferred feedback
    /// edges instead.
    async fn resolve_dependencies(
        self: &Rc<Self>,
        node: NodeId,
        records: Vec<WiringRecord>,
    ) -> Result<Dependencies<E::Node>, RenderError> {
        let mut dependencies = Dependencies {
            inputs: Vec::with_capacity(records.len()),
            deferred: Vec::new(),
        };

        for record in records {
            if self.waits_on(record.source, node) {
                #[cfg(feature = "tracing")]
                tracing::debug!("render_feedback: deferring {record}");
                dependencies.deferred.push(record);
                continue;
            }
            self.waiting.borrow_mut().insert(node, record.source);
            let resolved = self.render_node(record.source).await;
            self.waiting.borrow_mut().remove(&node);
            dependencies.inputs.push(RenderedInput {
                record,
                native: resolved?,
            });
        }

        Ok(dependencies)
    }

    /// Returns true if `source` is `node` or waits on it through the
    /// wait-for map.
    fn waits_on(&self, source: NodeId, node: NodeId) -> bool {
        let waiting = self.waiting.borrow();
        let mut current = source;
        loop {
            if current == node {
                return true;
            }
            match waiting.get(&current) {
                Some(&next) => current = next,
                None => return false,
            }
        }
    }

    /// Fails the entries of nodes that deferred a feedback edge from `node`.
    fn fail_feedback(&self, node: NodeId, error: &RenderError) {
        let edges = self.feedback.borrow_mut().remove(&node).unwrap_or_default();
        let mut entries = self.entries.borrow_mut();
        for edge in edges {
            let deferring = edge.record.target.owner();
            #[cfg(feature = "tracing")]
            tracing::debug!("render_feedback: {deferring} fails with {node}");
            let failed = futures::future::ready(Err(error.clone()))
                .boxed_local()
                .shared();
            entries.insert(deferring, failed);
        }
    }

    fn wire(
        &self,
        renderer: &dyn NodeRenderer<E>,
        upstream: &E::Node,
        record: &WiringRecord,
        native: &E::Node,
    ) -> Result<(), RenderError> {
        #[cfg(feature = "tracing")]
        tracing::debug!("render_wire: {record}");
        renderer
            .wire(&self.engine, &self.capabilities, upstream, record, native)
            .map_err(|source| RenderError::Wiring {
                record: *record,
                source,
            })
    }
}

impl<E: NativeEngine> fmt::Debug for RenderSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSession")
            .field("flavor", &self.engine.flavor())
            .field("entries", &self.entries.borrow().len())
            .field("waiting", &self.waiting.borrow().len())
            .finish_non_exhaustive()
    }
}
