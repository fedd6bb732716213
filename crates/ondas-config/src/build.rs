//! Building an [`AudioGraph`] from a graph file.

use ondas_core::NodeId;
use ondas_nodes::{AudioGraph, NodeFactory, NodeOptions};
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::graph_config::{DESTINATION_ID, Endpoint, GraphConfig};

/// A graph built from a [`GraphConfig`], with its node ids.
#[derive(Debug)]
pub struct BuiltGraph<E: NodeFactory> {
    /// The constructed graph.
    pub graph: AudioGraph<E>,
    /// Node id to graph node, destination included.
    pub ids: BTreeMap<String, NodeId>,
}

impl<E: NodeFactory> BuiltGraph<E> {
    /// Looks up the graph node of a file node id.
    pub fn node(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }
}

impl GraphConfig {
    /// Validate the file, then build its graph.
    ///
    /// Buffer sources with a `file` load it here; relative paths resolve
    /// against [`GraphConfig::base_dir`].
    pub fn build<E: NodeFactory>(&self) -> Result<BuiltGraph<E>, ConfigError> {
        self.validate()?;

        let mut graph = AudioGraph::new();
        let mut ids = BTreeMap::new();
        ids.insert(DESTINATION_ID.to_string(), graph.destination());

        for node in &self.nodes {
            let mut options = node.options.clone();
            if let (Some(file), NodeOptions::BufferSource(source)) = (&node.file, &mut options) {
                let path = self.resolve_file(file);
                let buffer = ondas_io::read_wav(&path).map_err(|error| ConfigError::Audio {
                    node: node.id.clone(),
                    path: path.clone(),
                    source: error,
                })?;
                source.buffer = Some(buffer);
            }
            let id = graph
                .add(options)
                .map_err(|e| ConfigError::graph(&node.id, e))?;
            ids.insert(node.id.clone(), id);
        }

        for connection in &self.connections {
            let lookup = |id: &str| {
                ids.get(id).copied().ok_or_else(|| {
                    ConfigError::graph(
                        id,
                        ondas_nodes::NodeError::InvalidAccess(format!("unknown node '{id}'")),
                    )
                })
            };
            let from = lookup(&connection.from)?;
            let wired = match connection.target() {
                Endpoint::Destination => graph.connect_output(
                    from,
                    connection.output,
                    graph.destination(),
                    connection.input,
                ),
                Endpoint::Node(to) => {
                    graph.connect_output(from, connection.output, lookup(to)?, connection.input)
                }
                Endpoint::Param { node, param } => {
                    graph.connect_param(from, connection.output, lookup(node)?, param)
                }
            };
            wired.map_err(|e| ConfigError::graph(&connection.from, e))?;
        }

        Ok(BuiltGraph { graph, ids })
    }
}
