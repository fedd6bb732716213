//! Render schedule compiled from a [`Network`] when rendering starts.
//!
//! Only nodes the destination pulls from (through inputs or params) are
//! scheduled. Order comes from repeated Kahn sorts over the dependency
//! edges:
//!
//! 1. Sort with every edge. Delays left over and lying on a cycle become
//!    *cycle delays*: their input edges are dropped, and they run split into
//!    [`RenderStep::EmitDelay`] and a trailing [`RenderStep::AbsorbDelay`].
//! 2. Sort again. Nodes still left over and still on a cycle form loops
//!    without a delay; they are muted and their incoming edges dropped.
//! 3. The final sort places every remaining node.

use std::collections::{HashSet, VecDeque};

use crate::network::{Network, Port};

/// A single instruction of one render quantum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderStep {
    /// Gather inputs and params, run the processor.
    Process(usize),
    /// Output silence.
    Mute(usize),
    /// First half of a cycle delay: output from history.
    EmitDelay(usize),
    /// Second half of a cycle delay: store this quantum's input.
    AbsorbDelay(usize),
}

/// Upstream nodes feeding one node.
#[derive(Debug, Clone, Default)]
pub(crate) struct Feeds {
    pub inputs: Vec<usize>,
    /// `(param index, source)` pairs.
    pub params: Vec<(usize, usize)>,
}

#[derive(Debug)]
pub(crate) struct CompiledSchedule {
    pub steps: Vec<RenderStep>,
    /// Indexed by node.
    pub feeds: Vec<Feeds>,
    pub cycle_delays: Vec<usize>,
    pub muted: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    source: usize,
    target: usize,
    is_input: bool,
}

/// Compiles the schedule rendering into [`Network::DESTINATION`].
pub(crate) fn compile(network: &Network) -> CompiledSchedule {
    let node_count = network.nodes.len();
    let reachable = reachable_from(network, Network::DESTINATION);

    let mut feeds = vec![Feeds::default(); node_count];
    let edges: Vec<Edge> = network
        .connections
        .iter()
        .filter(|c| reachable.contains(&c.target))
        .map(|c| {
            let feed = &mut feeds[c.target];
            match c.port {
                Port::Input(_) => feed.inputs.push(c.source),
                Port::Param(param) => feed.params.push((param, c.source)),
            }
            Edge {
                source: c.source,
                target: c.target,
                is_input: matches!(c.port, Port::Input(_)),
            }
        })
        .collect();

    let mut nodes: Vec<usize> = reachable.iter().copied().collect();
    nodes.sort_unstable();

    let (_, leftover) = kahn_sort(&nodes, &edges, node_count);
    let cycle_delays: Vec<usize> = leftover
        .iter()
        .copied()
        .filter(|&n| network.nodes[n].processor.is_delay() && on_cycle(n, &edges))
        .collect();

    let edges: Vec<Edge> = edges
        .into_iter()
        .filter(|e| !(e.is_input && cycle_delays.contains(&e.target)))
        .collect();
    let (_, leftover) = kahn_sort(&nodes, &edges, node_count);
    let muted: Vec<usize> = leftover
        .iter()
        .copied()
        .filter(|&n| on_cycle(n, &edges))
        .collect();

    let edges: Vec<Edge> = edges
        .into_iter()
        .filter(|e| !muted.contains(&e.target))
        .collect();
    let (sorted, unplaced) = kahn_sort(&nodes, &edges, node_count);
    debug_assert!(unplaced.is_empty());

    let mut steps: Vec<RenderStep> = sorted
        .iter()
        .map(|&n| {
            if muted.contains(&n) {
                RenderStep::Mute(n)
            } else if cycle_delays.contains(&n) {
                RenderStep::EmitDelay(n)
            } else {
                RenderStep::Process(n)
            }
        })
        .collect();
    let cycle_delays: Vec<usize> = cycle_delays
        .into_iter()
        .filter(|n| !muted.contains(n))
        .collect();
    steps.extend(cycle_delays.iter().map(|&n| RenderStep::AbsorbDelay(n)));

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "engine_compile: {} of {} nodes scheduled, {} cycle delays, {} muted",
        sorted.len(),
        node_count,
        cycle_delays.len(),
        muted.len()
    );

    CompiledSchedule {
        steps,
        feeds,
        cycle_delays,
        muted,
    }
}

/// Nodes `root` pulls from, `root` included.
fn reachable_from(network: &Network, root: usize) -> HashSet<usize> {
    let mut seen = HashSet::from([root]);
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        for connection in network.connections.iter().filter(|c| c.target == node) {
            if seen.insert(connection.source) {
                stack.push(connection.source);
            }
        }
    }
    seen
}

/// Kahn's algorithm over `nodes`. Returns the sorted nodes (dependencies
/// first, ties in index order) and the nodes that could not be placed.
fn kahn_sort(nodes: &[usize], edges: &[Edge], node_count: usize) -> (Vec<usize>, Vec<usize>) {
    let mut in_degree = vec![0usize; node_count];
    for edge in edges {
        in_degree[edge.target] += 1;
    }

    let mut queue: VecDeque<usize> = nodes.iter().copied().filter(|&n| in_degree[n] == 0).collect();
    let mut sorted = Vec::with_capacity(nodes.len());
    while let Some(node) = queue.pop_front() {
        sorted.push(node);
        for edge in edges.iter().filter(|e| e.source == node) {
            in_degree[edge.target] -= 1;
            if in_degree[edge.target] == 0 {
                queue.push_back(edge.target);
            }
        }
    }

    let leftover = nodes
        .iter()
        .copied()
        .filter(|n| !sorted.contains(n))
        .collect();
    (sorted, leftover)
}

/// Returns true if `node` can reach itself along `edges`.
fn on_cycle(node: usize, edges: &[Edge]) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        for edge in edges.iter().filter(|e| e.source == current) {
            if edge.target == node {
                return true;
            }
            if seen.insert(edge.target) {
                stack.push(edge.target);
            }
        }
    }
    false
}
