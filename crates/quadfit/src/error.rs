//! Error types for quadric fitting and classification.

use quadfit_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur while fitting, classifying or evaluating a quadric.
#[derive(Error, Debug)]
pub enum QuadricError {
    /// Input cannot define a surface (empty mesh, zero area, all-zero coefficients).
    #[error("undefined input: {0}")]
    UndefinedInput(String),

    /// The coefficient solver could not produce a stable solution.
    #[error("solver failure: {0}")]
    SolverFailure(String),

    /// Eigendecomposition did not converge or a required inverse does not exist.
    #[error("computation error: {0}")]
    Computation(String),

    /// The distance approximation is undefined at this point.
    #[error("distance undefined: {0}")]
    DistanceDomain(String),

    /// Invalid fit settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Mesh could not be read.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Settings could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for quadric operations.
pub type Result<T> = std::result::Result<T, QuadricError>;
