//! Job service for lidflow solves.
//!
//! Runs solves as jobs that callers can drive from any thread. Parameters
//! are validated against [`ParameterLimits`]. Each job gets its own named
//! worker thread, which steps a [`lidflow_solver::Solver`] one outer
//! iteration at a time and checks for cancellation between iterations.
//! Progress is fanned out to subscribers as [`ProgressEvent`]s, and
//! finished results are kept in a [`JobRegistry`] until removed.
//!
//! Start with [`SolverService`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod job;
pub mod progress;
pub mod registry;
pub mod service;

pub use config::{ConfigError, ParameterLimits, ServiceConfig};
pub use job::{JobError, JobId, JobRecord, JobStatus};
pub use progress::{estimate_remaining, ProgressEvent};
pub use registry::JobRegistry;
pub use service::{ShutdownReport, SolverService};
