//! Property-based tests for the render coordinator.
//!
//! Random graphs, cycles included, must render with every upstream node
//! instantiated once and every upstream record wired once, in insertion
//! order per destination.

mod common;

use std::collections::HashSet;
use std::rc::Rc;

use common::{Harness, StubEngine, Style};
use futures::executor::block_on;
use ondas_core::{CapabilityCache, NodeId, RenderSession};
use proptest::prelude::*;

const LABELS: [&str; 8] = ["n0", "n1", "n2", "n3", "n4", "n5", "n6", "n7"];

/// Nodes upstream of (and including) `root`.
fn upstream(h: &Harness, root: NodeId) -> HashSet<NodeId> {
    let graph = h.graph.borrow();
    let mut seen = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if seen.insert(node) {
            stack.extend(graph.records_into(node).iter().map(|r| r.source));
        }
    }
    seen
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any graph over up to 8 nodes, cycles and duplicate edges
    /// included, rendering node 0 instantiates each upstream node exactly
    /// once and realizes each upstream record exactly once.
    #[test]
    fn render_is_at_most_once(
        count in 1usize..8,
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..24),
    ) {
        let h = Harness::new();
        let nodes: Vec<NodeId> = LABELS[..count].iter().map(|&l| h.node(l)).collect();
        for &(from, to) in &edges {
            h.wire(nodes[from % count], nodes[to % count]);
        }

        let reachable = upstream(&h, nodes[0]);
        let expected_wires: usize = reachable
            .iter()
            .map(|n| h.graph.borrow().records_into(*n).len())
            .sum();

        let session = RenderSession::new(
            Rc::clone(&h.graph),
            Rc::new(StubEngine::new(Style::Future)),
            CapabilityCache::new(),
        );
        prop_assert!(block_on(session.render(nodes[0])).is_ok());

        for (i, node) in nodes.iter().enumerate() {
            let expected = usize::from(reachable.contains(node));
            prop_assert_eq!(h.renders_of(LABELS[i]), expected, "node {}", i);
        }
        prop_assert_eq!(session.engine().connections().len(), expected_wires);
    }

    /// Sources wired into one input are connected in the order they were
    /// wired, whatever that order is.
    #[test]
    fn wiring_order_matches_insertion(order in Just((1usize..8).collect::<Vec<_>>()).prop_shuffle()) {
        let h = Harness::new();
        let nodes: Vec<NodeId> = LABELS.iter().map(|&l| h.node(l)).collect();
        for &i in &order {
            h.wire(nodes[i], nodes[0]);
        }

        let session = RenderSession::new(
            Rc::clone(&h.graph),
            Rc::new(StubEngine::new(Style::Future)),
            CapabilityCache::new(),
        );
        block_on(session.render(nodes[0])).unwrap();

        let wired: Vec<&str> = session
            .engine()
            .connections()
            .into_iter()
            .map(|(from, _)| from)
            .collect();
        let expected: Vec<&str> = order.iter().map(|&i| LABELS[i]).collect();
        prop_assert_eq!(wired, expected);
    }
}
