//! Error types shared by every stage of the transformation pipeline.

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Pipeline stage a calculation failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validation,
    ProjectionResolution,
    TransformResolution,
    Verification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validation => "input validation",
            Stage::ProjectionResolution => "projection resolution",
            Stage::TransformResolution => "transform resolution",
            Stage::Verification => "verification",
        };
        f.write_str(name)
    }
}

/// Errors raised by parsing, estimation and coordinate conversion.
#[derive(Error, Debug)]
pub enum GeoError {
    /// Malformed angle or numeric text.
    #[error("cannot parse '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// Fewer point pairs than the estimators need.
    #[error("at least {required} point pairs are required, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// Input sets that cannot be paired up.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Malformed or unsupported CRS description.
    #[error("invalid CRS definition: {0}")]
    Definition(String),

    /// A data file (geoid grid) that is not installed or cannot be read.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// A coordinate operation that failed for the given input.
    #[error("transform failed: {0}")]
    Transform(String),

    /// Rank-deficient system or optimizer that did not converge.
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// Failure inside one stage of the orchestrated calculation.
    #[error("{stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<GeoError>,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl GeoError {
    pub(crate) fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        GeoError::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Wraps this error with the pipeline stage it came from.
    pub fn in_stage(self, stage: Stage) -> Self {
        GeoError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the stage for stage-wrapped errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GeoError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the innermost error, skipping stage wrappers.
    pub fn root(&self) -> &GeoError {
        match self {
            GeoError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}
