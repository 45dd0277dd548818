// THEORY:
// Every failure the clump finder can raise falls into one of two families. A
// `Configuration` error means the caller asked for something the input cannot
// support and is always reported before any group growth starts. A
// `DataConsistency` error means an identity lookup that must succeed did not,
// so the point cloud and its spatial index have drifted apart. Neither is
// retried; the run is aborted and the error handed back to the caller.

use thiserror::Error;

/// Errors raised by cube materialization and the clustering stages.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FofError {
    /// Missing or inconsistent parameters, rejected before clustering starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An identity lookup that must succeed failed to find its target.
    #[error("data consistency violated: {0}")]
    DataConsistency(String),

    /// The flat sample buffer does not match the declared cube shape.
    #[error("cube shape mismatch: expected {expected} samples, got {actual}")]
    Shape { expected: usize, actual: usize },
}

pub type FofResult<T> = Result<T, FofError>;
