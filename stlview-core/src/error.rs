/// Error types shared by the viewer crates
use thiserror::Error;

/// Failures while decoding STL data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StlError {
    #[error("File too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),
    #[error("Unexpected end of file: header declares {declared} triangles, data holds {available}")]
    Truncated { declared: usize, available: usize },
    #[error("Failed to parse ASCII STL: {0}")]
    Ascii(String),
}

/// Failures while configuring or loading a viewer
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Failed to fetch {path}: {reason}")]
    Fetch { path: String, reason: String },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: StlError,
    },
    #[error("Invalid color {0:?}, expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("Invalid model configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Rendering surface error: {0}")]
    Surface(String),
}
