//! Error types for dual mesh generation

use std::fmt;

use thiserror::Error;

/// Pipeline stage, used to report where a run stopped or failed
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Blue-noise point sampling
    Sampling,
    /// Delaunay triangulation of the sampled points
    Triangulation,
    /// Voronoi dual graph construction
    DualGraph,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Sampling => "sampling",
            Stage::Triangulation => "triangulation",
            Stage::DualGraph => "dual graph",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during mesh generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A generation parameter is out of range (rejected before any work)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The point set cannot be triangulated
    #[error("degenerate input ({points} points): {reason}")]
    DegenerateInput {
        /// Number of points handed to the triangulator
        points: usize,
        /// What makes the input degenerate
        reason: String,
    },

    /// The half-edge structure handed between stages is malformed
    #[error("structural inconsistency in {stage} at index {index}: {message}")]
    StructuralInconsistency {
        /// Stage that detected the defect
        stage: Stage,
        /// Offending half-edge or point index
        index: usize,
        /// Description of the violated invariant
        message: String,
    },

    /// The caller's checkpoint stopped the run before a stage started
    #[error("generation cancelled before {stage}")]
    Cancelled {
        /// Stage that was about to start
        stage: Stage,
    },
}

/// Result type alias for mesh operations
pub type Result<T> = std::result::Result<T, MeshError>;
