//! SIMPLEC solver for steady, incompressible lid-driven cavity flow.
//!
//! Pressure is stored at cell centres and the two velocity components on
//! the cell faces of a staggered grid. Each outer iteration runs a fixed
//! pipeline of [`Stage`]s over the shared [`StaggeredGrid`], then the
//! [`ConvergenceMonitor`] measures the change in velocity and decides
//! whether to stop.
//!
//! # Pipeline order (each outer iteration)
//!
//! 1. [`MomentumPredictor`]: `p, u, v` → `u_star, v_star, a_P` per face
//! 2. [`PressureCorrection`]: `u_star, v_star, a_P` → `p_prime`
//! 3. [`FieldCorrector`]: `p_prime` → `p, u, v`
//! 4. [`BoundaryEnforcer`]: no-slip walls and the moving lid on `u, v`
//!
//! The single entry point is [`solve()`]; [`Solver`] exposes the same loop
//! one iteration at a time for callers that need to interleave work.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod corrector;
pub mod grid;
pub mod metrics;
pub mod momentum;
pub mod monitor;
pub mod postprocess;
pub mod pressure;
pub mod solver;
pub mod stage;

pub use boundary::BoundaryEnforcer;
pub use corrector::FieldCorrector;
pub use grid::{GridGeometry, StaggeredGrid};
pub use metrics::IterationMetrics;
pub use momentum::MomentumPredictor;
pub use monitor::{ConvergenceMonitor, Verdict};
pub use pressure::PressureCorrection;
pub use solver::{simplec_pipeline, solve, SolvePhase, Solver};
pub use stage::{Stage, StageContext};
