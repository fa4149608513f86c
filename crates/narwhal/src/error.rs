#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("edge {edge} has a missing endpoint: node {node} is not in the graph")]
    MissingEndpoint { edge: usize, node: usize },
    #[error("edge {edge} is invalid: {reason}")]
    InvalidEdge { edge: usize, reason: &'static str },
    #[error("node {node} is out of range (graph has {node_count} nodes)")]
    NodeOutOfRange { node: usize, node_count: usize },
    #[error("layout was cancelled")]
    Cancelled,
    #[error("invalid layout settings: {0}")]
    Settings(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
