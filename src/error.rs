//! Error types for the spectrum core

use thiserror::Error;

/// Failures raised by the spectrum, color and path operations.
///
/// Every variant is a contract violation detected synchronously at the
/// boundary of the offending call; nothing here is transient or retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    /// Malformed spectrum configuration (non-positive, misordered or non power-of-two fields)
    #[error("Invalid spectrum configuration: {0}")]
    InvalidConfig(String),

    /// A weight table referenced a bin beyond the current frame
    #[error("Band {band} references bin {bin} but the frame only holds {len} bins")]
    IndexOutOfRange { band: usize, bin: usize, len: usize },

    /// Path text contained a segment tag other than M, L or C
    #[error("Unknown path component type {0}")]
    UnknownSegmentKind(char),

    /// A path builder was handed no points at all
    #[error("Cannot build a path from an empty point list")]
    EmptyPoints,

    /// Path text that could not be parsed for a reason other than an unknown tag
    #[error("Malformed path: {0}")]
    MalformedPath(String),
}

/// Result type alias for spectrum operations
pub type Result<T> = std::result::Result<T, SpectrumError>;
