//! Graph loading error types.

/// Errors that can occur when locating, parsing or validating a campus graph.
///
/// Variants carry messages rather than source errors so the type stays
/// `Clone` and can be shared out of the graph cache.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// No graph source matches the college code
    #[error("graph not found for college '{code}'")]
    NotFound { code: String },

    /// The source exists but is not a usable graph document
    #[error("invalid graph: {message}")]
    InvalidGraph { message: String },

    /// An edge references a node id that is not in the node list
    #[error("invalid edge: {from} -> {to} references missing node")]
    DanglingEdge { from: String, to: String },

    /// Reading the source failed
    #[error("failed to read graph source {path}: {message}")]
    Io { path: String, message: String },
}

impl GraphError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GraphError::InvalidGraph {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        GraphError::invalid(err.to_string())
    }
}
