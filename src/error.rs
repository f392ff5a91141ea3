use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unresolved {axis} position key `{key}` for node `{node}`")]
    UnresolvedPosition { axis: Axis, key: String, node: String },

    #[error("edge {source_key} -> {target} references unknown node `{key}`")]
    UnresolvedNode {
        key: String,
        source_key: String,
        target: String,
    },

    #[error("root node `{root}` is not defined by any active section")]
    MissingRoot { root: String },

    #[error("column key `{key}` has no usable trailing column number")]
    InvalidColumnKey { key: String },

    #[error("invalid fold threshold {value}: must be a finite number")]
    InvalidThreshold { value: f64 },

    #[error("invalid edge value {value}: flows must be non-negative")]
    InvalidEdgeValue { value: f64 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode input: {0}")]
    Json(#[from] serde_json::Error),
}
