//! Parse-time fatal conditions (§6.1), each carrying the offending line
//! number so a caller can point a user at the bad input directly.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("line {line}: malformed header: {message}")]
    MalformedHeader { line: usize, message: String },

    #[error("line {line}: truncated record")]
    TruncatedRecord { line: usize },

    #[error("line {line}: unrecognized record type {tag:?}")]
    UnknownRecord { line: usize, tag: String },

    #[error("line {line}: edge references nodes on non-adjacent layers ({down_layer} -> {up_layer})")]
    NonAdjacentLayers { line: usize, down_layer: u32, up_layer: u32 },

    #[error("line {line}: duplicate position {position} in layer {layer}")]
    DuplicatePosition { line: usize, layer: u32, position: u32 },

    #[error("line {line}: reference to unknown node id {id:?}")]
    DanglingEndpoint { line: usize, id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
