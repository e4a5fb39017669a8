use thiserror::Error;

/// Failures at the I/O boundary: reading the graph, embeddings, or settings.
///
/// The analyzers themselves never fail; anything that reaches them has
/// already been loaded in full.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Node {0} has no embedding")]
    MissingEmbedding(String),
}

pub type Result<T> = std::result::Result<T, LoadError>;
