//! Lidflow: steady lid-driven cavity flow with the SIMPLEC algorithm.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all lidflow sub-crates. For most users, adding `lidflow` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use lidflow::prelude::*;
//! use lidflow::solver::postprocess;
//!
//! let params = SimulationParameters::new(100.0)
//!     .with_grid(21, 21)
//!     .with_tolerance(1e-4);
//!
//! let mut history = Vec::new();
//! let mut on_progress = |r: &ProgressReport| history.push(r.iteration);
//! let result = solve(&params, Some(&mut on_progress)).unwrap();
//!
//! assert!(result.converged);
//! assert_eq!(result.velocity_u.shape(), (21, 20));
//! assert_eq!(history.len(), result.convergence_history.len());
//!
//! // The primary vortex turns the flow back along the vertical centreline.
//! let profile = postprocess::vertical_centerline_u(&result);
//! let u_min = profile.iter().map(|&(_, u)| u).fold(f64::INFINITY, f64::min);
//! assert!(u_min < 0.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lidflow-core` | Parameters, `Field2`, progress, results, errors |
//! | [`solver`] | `lidflow-solver` | Staggered grid, SIMPLEC stages, monitor, `solve()` |
//! | [`engine`] | `lidflow-engine` | Parameter limits, job registry, worker service |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Parameters, fields, progress reporting, results and errors
/// (`lidflow-core`).
pub use lidflow_core as types;

/// The SIMPLEC solver (`lidflow-solver`).
///
/// [`solver::solve`] runs a whole solve; [`solver::Solver`] steps it one
/// outer iteration at a time. Custom [`solver::Stage`]s can be slotted
/// into the pipeline with [`solver::Solver::with_pipeline`].
pub use lidflow_solver as solver;

/// Background jobs (`lidflow-engine`).
///
/// [`engine::SolverService`] validates parameters, runs each solve on a
/// worker thread and streams [`engine::ProgressEvent`]s to subscribers.
pub use lidflow_engine as engine;

/// Common imports for typical lidflow usage.
///
/// ```rust
/// use lidflow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use lidflow_core::{
        CoefficientMode, ConvergenceRecord, Field2, ProgressReport, ProgressSink, ResidualPair,
        SimulationParameters, SolveResult,
    };

    // Errors
    pub use lidflow_core::{ProgressError, SolveError, StageError};

    // Solver
    pub use lidflow_solver::{solve, SolvePhase, Solver, Stage, StageContext, StaggeredGrid};

    // Engine
    pub use lidflow_engine::{
        JobError, JobId, JobStatus, ProgressEvent, ServiceConfig, SolverService,
    };
}
