//! Error types for the lidflow solver.
//!
//! Organized by subsystem: per-stage failures ([`StageError`]), whole-solve
//! failures ([`SolveError`]), and progress delivery failures
//! ([`ProgressError`]). Non-convergence is not an error; it is reported
//! through [`SolveResult::converged`](crate::SolveResult::converged).

use std::error::Error;
use std::fmt;

/// Errors from an individual solver stage.
///
/// Returned by `Stage::apply()` and wrapped in [`SolveError::StageFailed`]
/// by the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StageError {
    /// A grid array does not have the shape implied by the grid geometry.
    ShapeMismatch {
        /// Name of the offending array.
        field: &'static str,
        /// Expected `(rows, cols)`.
        expected: (usize, usize),
        /// Actual `(rows, cols)`.
        actual: (usize, usize),
    },
    /// The stage could not complete.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "field '{field}' has shape {}x{}, expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
        }
    }
}

impl Error for StageError {}

/// Errors that abort a solve invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveError {
    /// The node counts leave no interior cell on the staggered layout.
    DegenerateGrid {
        /// Configured node count along x.
        nx: usize,
        /// Configured node count along y.
        ny: usize,
    },
    /// A stage returned an error during an outer iteration.
    StageFailed {
        /// Name of the failing stage.
        stage: String,
        /// The underlying stage error.
        reason: StageError,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGrid { nx, ny } => write!(
                f,
                "grid {nx}x{ny} is degenerate: at least {} nodes per direction are required",
                crate::constants::MIN_GRID_NODES
            ),
            Self::StageFailed { stage, reason } => {
                write!(f, "stage '{stage}' failed: {reason}")
            }
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StageFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Errors reported by a [`ProgressSink`](crate::ProgressSink).
///
/// The solver logs these and carries on; a failing sink never aborts a solve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressError {
    /// The receiving side has gone away.
    Disconnected,
    /// The sink refused the report.
    Rejected {
        /// Why the report was refused.
        reason: String,
    },
}

impl fmt::Display for ProgressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "progress receiver disconnected"),
            Self::Rejected { reason } => write!(f, "progress report rejected: {reason}"),
        }
    }
}

impl Error for ProgressError {}
