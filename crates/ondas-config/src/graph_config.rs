//! Graph file format and operations.

use ondas_engine::{EngineOptions, EngineProfile};
use ondas_nodes::NodeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::validation::ValidationError;

/// Reserved node id naming the engine output in connections.
pub const DESTINATION_ID: &str = "destination";

/// A graph file: render settings, nodes and connections.
///
/// # TOML Format
///
/// ```toml
/// name = "Tremolo"
/// description = "Sine through a modulated gain"
///
/// [render]
/// sample_rate = 44100
/// length = 88200
/// channels = 1
/// profile = "legacy"
///
/// [[nodes]]
/// id = "tone"
/// type = "oscillator"
/// frequency = 330.0
///
/// [[nodes]]
/// id = "amp"
/// type = "gain"
/// gain = 0.5
///
/// [[nodes]]
/// id = "lfo"
/// type = "oscillator"
/// frequency = 5.0
///
/// [[connections]]
/// from = "tone"
/// to = "amp"
///
/// [[connections]]
/// from = "lfo"
/// to = "amp.gain"
///
/// [[connections]]
/// from = "amp"
/// to = "destination"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GraphConfig {
    /// Name of the graph.
    pub name: String,

    /// Optional description of the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Render settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Nodes, in creation order.
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,

    /// Connections, in wiring order.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,

    /// Directory relative `file` paths resolve against.
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

impl GraphConfig {
    /// Create a new empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            render: RenderConfig::default(),
            nodes: Vec::new(),
            connections: Vec::new(),
            base_dir: None,
        }
    }

    /// Create a graph with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the render settings.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    /// Add a node.
    pub fn with_node(mut self, id: impl Into<String>, options: impl Into<NodeOptions>) -> Self {
        self.nodes.push(NodeConfig::new(id, options));
        self
    }

    /// Add a connection from output 0 to input 0 (or a param).
    pub fn with_connection(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.connections.push(ConnectionConfig::new(from, to));
        self
    }

    /// Load a graph from a TOML file.
    ///
    /// Relative buffer source `file` paths resolve against the file's
    /// directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let mut config = Self::from_toml(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    /// Load a graph from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the graph to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the graph to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Directory that relative paths resolve against, if loaded from a file.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Set the directory relative paths resolve against.
    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = Some(dir.into());
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&NodeConfig> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Resolve a node's `file` against the base directory.
    pub fn resolve_file(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }
}

/// Render settings of a graph file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Length in frames. Exclusive with `duration`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Length in seconds. Exclusive with `length`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Output channel count.
    pub channels: usize,
    /// Engine profile (`"modern"` or `"legacy"`).
    pub profile: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            length: None,
            duration: None,
            channels: 2,
            profile: EngineProfile::default().name().to_string(),
        }
    }
}

impl RenderConfig {
    /// Default render length when neither `length` nor `duration` is set.
    pub const DEFAULT_DURATION: f64 = 1.0;

    /// Number of frames to render.
    pub fn frames(&self) -> Result<usize, ValidationError> {
        match (self.length, self.duration) {
            (Some(_), Some(_)) => Err(ValidationError::InvalidRender(
                "set either length or duration, not both".to_string(),
            )),
            (Some(length), None) => Ok(length),
            (None, duration) => {
                let seconds = duration.unwrap_or(Self::DEFAULT_DURATION);
                if !(seconds.is_finite() && seconds > 0.0) {
                    return Err(ValidationError::InvalidRender(format!(
                        "duration must be positive, got {seconds}"
                    )));
                }
                Ok((seconds * f64::from(self.sample_rate)).round() as usize)
            }
        }
    }

    /// Engine options for these settings, validated.
    pub fn engine_options(&self) -> Result<EngineOptions, ValidationError> {
        let profile: EngineProfile = self
            .profile
            .parse()
            .map_err(|e: ondas_core::EngineError| ValidationError::InvalidRender(e.to_string()))?;
        let options = EngineOptions {
            sample_rate: self.sample_rate as f32,
            length: self.frames()?,
            channels: self.channels,
            profile,
        };
        options
            .validate()
            .map_err(|e| ValidationError::InvalidRender(e.to_string()))?;
        Ok(options)
    }
}

/// One node of a graph file.
///
/// The node type and its options sit next to the id:
///
/// ```toml
/// [[nodes]]
/// id = "kick"
/// type = "buffer-source"
/// file = "samples/kick.wav"
/// loop = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    /// Unique node id, referenced by connections.
    pub id: String,
    /// WAV file played by a buffer source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Node type and options.
    #[serde(flatten)]
    pub options: NodeOptions,
}

impl NodeConfig {
    /// Create a node config.
    pub fn new(id: impl Into<String>, options: impl Into<NodeOptions>) -> Self {
        Self {
            id: id.into(),
            file: None,
            options: options.into(),
        }
    }

    /// Set the WAV file of a buffer source.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// One connection of a graph file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Source node id.
    pub from: String,
    /// Target: `"id"`, `"id.param"` or `"destination"`.
    pub to: String,
    /// Source output index.
    #[serde(default)]
    pub output: u32,
    /// Target input index; ignored for params.
    #[serde(default)]
    pub input: u32,
}

impl ConnectionConfig {
    /// Create a connection between output 0 and input 0.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            output: 0,
            input: 0,
        }
    }

    /// The parsed target endpoint.
    pub fn target(&self) -> Endpoint<'_> {
        Endpoint::parse(&self.to)
    }
}

/// Target of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// The engine output.
    Destination,
    /// An input of a node.
    Node(&'a str),
    /// A param of a node.
    Param {
        /// Node id.
        node: &'a str,
        /// Param name.
        param: &'a str,
    },
}

impl<'a> Endpoint<'a> {
    /// Parse `"id"`, `"id.param"` or `"destination"`.
    pub fn parse(target: &'a str) -> Self {
        match target.split_once('.') {
            Some((node, param)) => Endpoint::Param { node, param },
            None if target == DESTINATION_ID => Endpoint::Destination,
            None => Endpoint::Node(target),
        }
    }
}
