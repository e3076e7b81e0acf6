//! Core types and traits for the lidflow cavity-flow solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the records that cross the solver boundary: simulation parameters,
//! the row-major [`Field2`] array, progress reports and the
//! [`ProgressSink`] trait, the [`SolveResult`], and the error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod field;
pub mod params;
pub mod progress;
pub mod result;

pub use error::{ProgressError, SolveError, StageError};
pub use field::Field2;
pub use params::{CoefficientMode, SimulationParameters};
pub use progress::{ProgressReport, ProgressSink};
pub use result::{ConvergenceRecord, ResidualPair, SolveResult};
