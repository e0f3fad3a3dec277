//! Error types for artifact I/O and descriptor construction

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the edges of the crate.
///
/// The sampling math never fails; these cover file access, artifact
/// decoding and descriptor validation.
#[derive(Error, Debug)]
pub enum OrbitalError {
    /// Reading or writing an artifact failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An artifact could not be encoded or decoded
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An artifact decoded but violates the point cloud layout
    #[error("malformed orbital artifact {name}: {reason}")]
    Malformed { name: String, reason: String },

    #[error("invalid quantum numbers n={n}, l={l}, m={m}")]
    InvalidQuantumNumbers { n: u32, l: u32, m: i32 },

    #[error("invalid sampler configuration: {0}")]
    Config(#[source] serde_json::Error),
}

/// A specialized Result type for orbital operations
pub type Result<T> = std::result::Result<T, OrbitalError>;
