//! Graph file validation.
//!
//! [`validate_graph`] checks everything that can be checked without an
//! engine: node ids, option ranges, connection endpoints, output and input
//! indices, param names and render settings. It reports every problem it
//! finds, not just the first one.
//!
//! # Example
//!
//! ```rust
//! use ondas_config::{GraphConfig, ValidationError};
//!
//! let config = GraphConfig::new("broken").with_connection("ghost", "destination");
//! assert!(matches!(
//!     config.validate(),
//!     Err(ValidationError::UnknownNode { .. })
//! ));
//! ```

use ondas_nodes::NodeKind;
use std::collections::HashMap;
use thiserror::Error;

use crate::graph_config::{DESTINATION_ID, Endpoint, GraphConfig};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Two nodes share an id.
    #[error("duplicate node id: {0}")]
    DuplicateId(String),

    /// A node id is empty, reserved or contains a '.'.
    #[error("invalid node id '{id}': {reason}")]
    InvalidId {
        /// The offending id.
        id: String,
        /// Why it is rejected.
        reason: String,
    },

    /// Node options out of range.
    #[error("node '{node}': {reason}")]
    InvalidOptions {
        /// Node id.
        node: String,
        /// Description of the problem.
        reason: String,
    },

    /// A `file` on a node that is not a buffer source.
    #[error("node '{0}': only buffer sources take a file")]
    UnexpectedFile(String),

    /// A connection names a node that does not exist.
    #[error("connection {connection}: unknown node '{node}'")]
    UnknownNode {
        /// Index of the connection in the file.
        connection: usize,
        /// The missing id.
        node: String,
    },

    /// A connection targets a param the node type does not have.
    #[error("connection {connection}: {kind} '{node}' has no param '{param}'")]
    UnknownParam {
        /// Index of the connection in the file.
        connection: usize,
        /// Node id.
        node: String,
        /// Node type id.
        kind: &'static str,
        /// The missing param.
        param: String,
    },

    /// An output or input index past the node's count.
    #[error("connection {connection}: {port} {index} out of range for '{node}' (count {count})")]
    IndexOutOfRange {
        /// Index of the connection in the file.
        connection: usize,
        /// Node id.
        node: String,
        /// `"output"` or `"input"`.
        port: &'static str,
        /// The offending index.
        index: u32,
        /// Number of valid indices.
        count: u32,
    },

    /// The destination used as a connection source.
    #[error("connection {0}: the destination has no outputs")]
    DestinationAsSource(usize),

    /// Invalid render settings.
    #[error("invalid render settings: {0}")]
    InvalidRender(String),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Flattens into a list of single errors.
    pub fn into_errors(self) -> Vec<ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors,
            error => vec![error],
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a graph file.
pub fn validate_graph(config: &GraphConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(error) = config.render.engine_options() {
        errors.push(error);
    }

    let mut kinds: HashMap<&str, NodeKind> = HashMap::new();
    for node in &config.nodes {
        if let Some(reason) = id_problem(&node.id) {
            errors.push(ValidationError::InvalidId {
                id: node.id.clone(),
                reason: reason.to_string(),
            });
        } else if kinds.contains_key(node.id.as_str()) {
            errors.push(ValidationError::DuplicateId(node.id.clone()));
        } else {
            kinds.insert(&node.id, node.options.kind());
        }
        if let Err(error) = node.options.validate() {
            errors.push(ValidationError::InvalidOptions {
                node: node.id.clone(),
                reason: error.to_string(),
            });
        }
        if node.file.is_some() && node.options.kind() != NodeKind::BufferSource {
            errors.push(ValidationError::UnexpectedFile(node.id.clone()));
        }
    }

    for (index, connection) in config.connections.iter().enumerate() {
        let lookup = |id: &str| -> Result<NodeKind, ValidationError> {
            kinds
                .get(id)
                .copied()
                .ok_or_else(|| ValidationError::UnknownNode {
                    connection: index,
                    node: id.to_string(),
                })
        };

        if connection.from == DESTINATION_ID {
            errors.push(ValidationError::DestinationAsSource(index));
        } else {
            match lookup(&connection.from) {
                Ok(kind) => {
                    let outputs = kind.descriptor().outputs;
                    if connection.output >= outputs {
                        errors.push(ValidationError::IndexOutOfRange {
                            connection: index,
                            node: connection.from.clone(),
                            port: "output",
                            index: connection.output,
                            count: outputs,
                        });
                    }
                }
                Err(error) => errors.push(error),
            }
        }

        match connection.target() {
            Endpoint::Destination => {
                check_input(
                    &mut errors,
                    index,
                    DESTINATION_ID,
                    NodeKind::Destination,
                    connection.input,
                );
            }
            Endpoint::Node(id) => match lookup(id) {
                Ok(kind) => check_input(&mut errors, index, id, kind, connection.input),
                Err(error) => errors.push(error),
            },
            Endpoint::Param { node, param } => {
                let kind = if node == DESTINATION_ID {
                    Ok(NodeKind::Destination)
                } else {
                    lookup(node)
                };
                match kind {
                    Ok(kind) if kind.param(param).is_none() => {
                        errors.push(ValidationError::UnknownParam {
                            connection: index,
                            node: node.to_string(),
                            kind: kind.id(),
                            param: param.to_string(),
                        });
                    }
                    Ok(_) => {}
                    Err(error) => errors.push(error),
                }
            }
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

fn id_problem(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("must not be empty")
    } else if id == DESTINATION_ID {
        Some("reserved for the engine output")
    } else if id.contains('.') {
        Some("must not contain '.'")
    } else {
        None
    }
}

fn check_input(
    errors: &mut Vec<ValidationError>,
    connection: usize,
    node: &str,
    kind: NodeKind,
    input: u32,
) {
    let inputs = kind.descriptor().inputs;
    if input >= inputs {
        errors.push(ValidationError::IndexOutOfRange {
            connection,
            node: node.to_string(),
            port: "input",
            index: input,
            count: inputs,
        });
    }
}

impl GraphConfig {
    /// Validate the graph file. See [`validate_graph`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_graph(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_config::{ConnectionConfig, NodeConfig, RenderConfig};
    use ondas_nodes::{
        BufferSourceOptions, DelayOptions, GainOptions, OscillatorOptions, StereoPannerOptions,
    };

    fn chain() -> GraphConfig {
        GraphConfig::new("chain")
            .with_node("osc", OscillatorOptions::default())
            .with_node("amp", GainOptions::default())
            .with_connection("osc", "amp")
            .with_connection("amp", DESTINATION_ID)
    }

    #[test]
    fn test_valid_graph() {
        assert_eq!(chain().validate(), Ok(()));
    }

    #[test]
    fn test_param_target() {
        let config = chain()
            .with_node("lfo", OscillatorOptions::default())
            .with_connection("lfo", "amp.gain")
            .with_connection("lfo", "osc.detune");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_id() {
        let config = chain().with_node("amp", GainOptions::default());
        assert_eq!(
            config.validate(),
            Err(ValidationError::DuplicateId("amp".to_string()))
        );
    }

    #[test]
    fn test_invalid_ids() {
        let config = GraphConfig::new("ids")
            .with_node("", GainOptions::default())
            .with_node(DESTINATION_ID, GainOptions::default())
            .with_node("a.b", GainOptions::default());
        let errors = config.validate().unwrap_err().into_errors();
        assert_eq!(errors.len(), 3);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, ValidationError::InvalidId { .. }))
        );
    }

    #[test]
    fn test_unknown_nodes() {
        let config = chain().with_connection("ghost", "phantom");
        let errors = config.validate().unwrap_err().into_errors();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnknownNode {
                    connection: 2,
                    node: "ghost".to_string()
                },
                ValidationError::UnknownNode {
                    connection: 2,
                    node: "phantom".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_param() {
        let config = chain().with_connection("osc", "amp.frequency");
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnknownParam {
                connection: 2,
                node: "amp".to_string(),
                kind: "gain",
                param: "frequency".to_string(),
            })
        );
    }

    #[test]
    fn test_indices() {
        let mut config = chain();
        config.connections.push(ConnectionConfig {
            output: 1,
            ..ConnectionConfig::new("osc", "amp")
        });
        // Sources have no inputs.
        config.connections.push(ConnectionConfig::new("amp", "osc"));
        config.connections.push(ConnectionConfig {
            input: 1,
            ..ConnectionConfig::new("amp", DESTINATION_ID)
        });

        let errors = config.validate().unwrap_err().into_errors();
        assert_eq!(errors.len(), 3);
        assert!(matches!(
            &errors[0],
            ValidationError::IndexOutOfRange { port: "output", index: 1, count: 1, .. }
        ));
        assert!(matches!(
            &errors[1],
            ValidationError::IndexOutOfRange { port: "input", count: 0, .. }
        ));
        assert!(matches!(
            &errors[2],
            ValidationError::IndexOutOfRange { port: "input", index: 1, count: 1, .. }
        ));
    }

    #[test]
    fn test_destination_as_source() {
        let config = chain().with_connection(DESTINATION_ID, "amp");
        assert_eq!(
            config.validate(),
            Err(ValidationError::DestinationAsSource(2))
        );
    }

    #[test]
    fn test_option_ranges() {
        let config = GraphConfig::new("ranges")
            .with_node("pan", StereoPannerOptions { pan: 2.0 })
            .with_node(
                "echo",
                DelayOptions {
                    delay_time: 5.0,
                    max_delay_time: 1.0,
                },
            );
        let errors = config.validate().unwrap_err().into_errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], ValidationError::InvalidOptions { node, .. } if node == "pan"));
        assert!(matches!(&errors[1], ValidationError::InvalidOptions { node, .. } if node == "echo"));
    }

    #[test]
    fn test_file_only_on_buffer_source() {
        let mut config = GraphConfig::new("files");
        config
            .nodes
            .push(NodeConfig::new("sample", BufferSourceOptions::default()).with_file("a.wav"));
        assert_eq!(config.validate(), Ok(()));

        config
            .nodes
            .push(NodeConfig::new("amp", GainOptions::default()).with_file("b.wav"));
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnexpectedFile("amp".to_string()))
        );
    }

    #[test]
    fn test_render_settings_collected() {
        let config = chain()
            .with_render(RenderConfig {
                channels: 0,
                ..Default::default()
            })
            .with_connection("ghost", DESTINATION_ID);
        let errors = config.validate().unwrap_err().into_errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::InvalidRender(_)));
    }

    #[test]
    fn test_multiple_display() {
        let error = ValidationError::Multiple(vec![
            ValidationError::DuplicateId("a".to_string()),
            ValidationError::DestinationAsSource(3),
        ]);
        assert_eq!(
            error.to_string(),
            "multiple validation errors: duplicate node id: a; connection 3: the destination has no outputs"
        );
    }
}
