//! Error types for hierarchy construction.
//!
//! Collaborators (sparse kernels, strategies, smoothers, coarse solvers)
//! report [`StrategyError`]. The hierarchy builder wraps those into
//! [`AmgError`] together with the [`SetupStep`] that produced them.

use crate::direct::LuError;
use std::fmt;
use thiserror::Error;

/// Stage of hierarchy construction, attached to every propagated failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SetupStep {
    /// Validation of the fine operator and candidate vector
    Initialization,
    /// Strength-of-connection filtering
    StrengthOfConnection,
    /// Aggregation of the strength graph
    Aggregation,
    /// Tentative prolongator and coarse candidate construction
    CandidateFitting,
    /// Jacobi smoothing of the tentative prolongator
    ProlongationSmoothing,
    /// Restriction operator construction
    Restriction,
    /// Coarse operator `R * A * P`
    GalerkinProduct,
    /// Conversion from the setup format into the solve format
    FormatConversion,
    /// Per-level smoother construction
    Smoother,
    /// Coarse-level solver construction
    CoarseSolver,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupStep::Initialization => "initialization",
            SetupStep::StrengthOfConnection => "strength of connection",
            SetupStep::Aggregation => "aggregation",
            SetupStep::CandidateFitting => "candidate fitting",
            SetupStep::ProlongationSmoothing => "prolongation smoothing",
            SetupStep::Restriction => "restriction",
            SetupStep::GalerkinProduct => "Galerkin product",
            SetupStep::FormatConversion => "format conversion",
            SetupStep::Smoother => "smoother construction",
            SetupStep::CoarseSolver => "coarse solver construction",
        };
        f.write_str(name)
    }
}

/// Failure reported by a collaborator: a sparse kernel, a strategy
/// algorithm, a smoother or the coarse solver.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The operation needs a square matrix.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Operand dimensions do not conform.
    #[error("dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Which operand was checked
        what: &'static str,
        /// Expected size
        expected: usize,
        /// Actual size
        got: usize,
    },

    /// A diagonal entry needed for scaling is zero.
    #[error("zero diagonal entry at row {row}")]
    ZeroDiagonal {
        /// Row with the vanishing diagonal
        row: usize,
    },

    /// The aggregation map is not a total partition onto `0..k`.
    #[error("invalid aggregates: {0}")]
    InvalidAggregates(String),

    /// A matrix could not be represented in the requested format.
    #[error("format conversion failed: {0}")]
    FormatConversion(String),

    /// Dense factorization failure.
    #[error(transparent)]
    Lu(#[from] LuError),

    /// Any other collaborator-specific failure.
    #[error("{0}")]
    Failed(String),
}

impl StrategyError {
    /// Returns `true` for errors caused by non-conforming dimensions.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            StrategyError::NotSquare { .. } | StrategyError::DimensionMismatch { .. }
        )
    }
}

/// Errors raised while building a smoothed aggregation hierarchy.
#[derive(Debug, Error)]
pub enum AmgError {
    /// `max_levels` or `min_level_size` is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Non-conforming matrix dimensions between setup steps.
    #[error("invalid shape during {step}: {detail}")]
    InvalidShape {
        /// Step that detected the mismatch
        step: SetupStep,
        /// Human readable description
        detail: String,
    },

    /// A strategy algorithm, matrix kernel, smoother or solver failed.
    #[error("{step} failed: {source}")]
    CollaboratorFailure {
        /// Step whose collaborator failed
        step: SetupStep,
        /// Underlying failure
        #[source]
        source: StrategyError,
    },

    /// The hierarchy holds no levels.
    #[error("hierarchy is empty, call initialize first")]
    EmptyHierarchy,
}

/// A specialized `Result` type for hierarchy construction.
pub type Result<T> = std::result::Result<T, AmgError>;

impl AmgError {
    /// Wrap a collaborator failure, attaching the step it came from.
    ///
    /// Shape errors become [`AmgError::InvalidShape`], everything else
    /// [`AmgError::CollaboratorFailure`].
    pub fn at_step(step: SetupStep, source: StrategyError) -> Self {
        if source.is_shape_error() {
            AmgError::InvalidShape {
                step,
                detail: source.to_string(),
            }
        } else {
            AmgError::CollaboratorFailure { step, source }
        }
    }

    /// Shape mismatch detected by the builder itself.
    pub(crate) fn shape(step: SetupStep, detail: impl Into<String>) -> Self {
        AmgError::InvalidShape {
            step,
            detail: detail.into(),
        }
    }

    /// Step that produced the error, if any.
    pub fn step(&self) -> Option<SetupStep> {
        match self {
            AmgError::InvalidShape { step, .. } | AmgError::CollaboratorFailure { step, .. } => {
                Some(*step)
            }
            AmgError::InvalidConfiguration(_) | AmgError::EmptyHierarchy => None,
        }
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config_error(&self) -> bool {
        matches!(self, AmgError::InvalidConfiguration(_))
    }

    /// Returns `true` if this is a shape error.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, AmgError::InvalidShape { .. })
    }
}
