use crate::id::NodeId;
use thiserror::Error;

/// Fatal errors. Any of these aborts the whole synchronization run.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("invalid canvas JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An edge endpoint matches no card, file, url or group.
    #[error("edge {edge} references node {node}, which is not on the canvas")]
    UnresolvedEndpoint { edge: NodeId, node: NodeId },

    #[error("could not find other side of edge {edge} (node {node})")]
    OtherSideNotFound { edge: NodeId, node: NodeId },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures reported by a document store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: malformed front matter: {message}")]
    Malformed { path: String, message: String },
}
