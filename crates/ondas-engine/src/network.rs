//! Native node storage and connections of one engine.

use ondas_core::EngineError;
use ondas_nodes::{NodeKind, ParamSpec};

use crate::processor::Processor;

/// Where a connection lands on its target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Port {
    Input(u32),
    /// Index into the target's params.
    Param(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Connection {
    pub source: usize,
    pub output: u32,
    pub target: usize,
    pub port: Port,
}

/// An a-rate param: its base value plus whatever is connected to it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Param {
    pub name: &'static str,
    pub value: f32,
    pub min: f32,
    pub max: f32,
}

impl Param {
    fn from_spec(spec: &ParamSpec) -> Self {
        Self {
            name: spec.name,
            value: spec.default,
            min: spec.min,
            max: spec.max,
        }
    }
}

#[derive(Debug)]
pub(crate) struct NativeNode {
    pub label: &'static str,
    pub inputs: u32,
    pub outputs: u32,
    pub params: Vec<Param>,
    pub processor: Processor,
}

impl NativeNode {
    /// A node shaped like `kind`, its params at their defaults.
    pub fn of_kind(kind: NodeKind, processor: Processor) -> Self {
        let descriptor = kind.descriptor();
        Self {
            label: descriptor.id,
            inputs: descriptor.inputs,
            outputs: descriptor.outputs,
            params: descriptor.params.iter().map(Param::from_spec).collect(),
            processor,
        }
    }

    /// Overrides param base values by name. Unknown names are ignored.
    pub fn with_values(mut self, values: &[(&str, f32)]) -> Self {
        for (name, value) in values {
            if let Some(param) = self.params.iter_mut().find(|p| p.name == *name) {
                param.value = *value;
            }
        }
        self
    }
}

/// Every native node and connection of one engine. Node 0 is the destination.
#[derive(Debug)]
pub(crate) struct Network {
    pub nodes: Vec<NativeNode>,
    pub connections: Vec<Connection>,
}

impl Network {
    pub const DESTINATION: usize = 0;

    pub fn new(channels: usize) -> Self {
        Self {
            nodes: vec![NativeNode::of_kind(
                NodeKind::Destination,
                Processor::Destination { channels },
            )],
            connections: Vec::new(),
        }
    }

    pub fn add(&mut self, node: NativeNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Adds a connection after checking the endpoints. Repeating an existing
    /// connection is a no-op.
    pub fn connect(&mut self, connection: Connection) -> Result<(), EngineError> {
        let source = &self.nodes[connection.source];
        if connection.output >= source.outputs {
            return Err(EngineError::IndexSize {
                index: connection.output,
                count: source.outputs,
            });
        }
        let target = &self.nodes[connection.target];
        match connection.port {
            Port::Input(input) if input >= target.inputs => {
                return Err(EngineError::IndexSize {
                    index: input,
                    count: target.inputs,
                });
            }
            Port::Param(index) if index >= target.params.len() => {
                return Err(EngineError::invalid_access(format!(
                    "{} has no param #{index}",
                    target.label
                )));
            }
            _ => {}
        }
        if !self.connections.contains(&connection) {
            self.connections.push(connection);
        }
        Ok(())
    }

    /// Index of `target`'s param called `name`.
    pub fn param_index(&self, target: usize, name: &str) -> Result<usize, EngineError> {
        let node = &self.nodes[target];
        node.params
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| {
                EngineError::invalid_access(format!("{} has no param named '{name}'", node.label))
            })
    }

    /// Drops every connection leaving `source`.
    pub fn disconnect(&mut self, source: usize) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| c.source != source);
        before - self.connections.len()
    }

    /// Returns true if anything is connected to the destination.
    pub fn has_active_output(&self) -> bool {
        self.connections
            .iter()
            .any(|c| c.target == Self::DESTINATION && matches!(c.port, Port::Input(_)))
    }
}
