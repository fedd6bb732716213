//! Error types for graph file operations.

use ondas_nodes::NodeError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving or building a graph file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Validation errors
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// Failed to load the audio file of a buffer source
    #[error("failed to load audio for node '{node}' from '{path}': {source}")]
    Audio {
        /// Id of the buffer source node.
        node: String,
        /// Resolved path of the audio file.
        path: PathBuf,
        /// Underlying WAV error.
        #[source]
        source: ondas_io::Error,
    },

    /// The graph rejected a node or connection
    #[error("graph error at '{node}': {source}")]
    Graph {
        /// Id of the node being added or connected.
        node: String,
        /// Underlying node error.
        #[source]
        source: NodeError,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a graph error for `node`.
    pub fn graph(node: impl Into<String>, source: NodeError) -> Self {
        ConfigError::Graph {
            node: node.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::NotFound, "mock")
    }

    #[test]
    fn read_file_display() {
        let err = ConfigError::read_file("/a/b.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/a/b.toml"), "got: {msg}");
        assert!(err.source().is_some(), "ReadFile must expose I/O source");
    }

    #[test]
    fn write_file_display() {
        let err = ConfigError::write_file("/a/b.toml", mock_io_err());
        assert!(matches!(
            err,
            ConfigError::WriteFile { ref path, .. } if path == std::path::Path::new("/a/b.toml")
        ));
        assert!(err.to_string().contains("failed to write file"));
    }

    #[test]
    fn graph_display() {
        let err = ConfigError::graph("lfo", NodeError::IndexSize { index: 2, count: 1 });
        assert_eq!(
            err.to_string(),
            "graph error at 'lfo': index 2 out of range (count 1)"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn validation_wraps_error() {
        let err = ConfigError::from(crate::ValidationError::DuplicateId("a".to_string()));
        assert_eq!(err.to_string(), "validation failed: duplicate node id: a");
        assert!(err.source().is_some());
    }
}
