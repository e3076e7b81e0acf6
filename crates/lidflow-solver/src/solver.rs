//! Solve orchestrator: the outer SIMPLEC loop.
//!
//! [`Solver`] owns the grid, the stage pipeline and the convergence
//! monitor for exactly one solve. [`solve()`] drives it to a terminal
//! phase and assembles the [`SolveResult`].

use std::time::Instant;

use lidflow_core::{
    ProgressReport, ProgressSink, ResidualPair, SimulationParameters, SolveError, SolveResult,
};

use crate::boundary::BoundaryEnforcer;
use crate::corrector::FieldCorrector;
use crate::grid::{GridGeometry, StaggeredGrid};
use crate::metrics::IterationMetrics;
use crate::momentum::MomentumPredictor;
use crate::monitor::{residual, ConvergenceMonitor, Verdict};
use crate::pressure::PressureCorrection;
use crate::stage::{Stage, StageContext};

/// Lifecycle of a solve.
///
/// `Initialized → Iterating → {Converged, Exhausted}`; both end states are
/// terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolvePhase {
    /// Grid allocated, no iteration run yet.
    Initialized,
    /// At least one iteration run, criteria not yet met.
    Iterating,
    /// Both residuals fell below the tolerance.
    Converged,
    /// The iteration budget ran out first.
    Exhausted,
}

impl SolvePhase {
    /// Returns `true` for `Converged` and `Exhausted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::Exhausted)
    }
}

/// The standard SIMPLEC pipeline, in execution order.
pub fn simplec_pipeline() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(MomentumPredictor::new()),
        Box::new(PressureCorrection::new()),
        Box::new(FieldCorrector::new()),
        Box::new(BoundaryEnforcer::new()),
    ]
}

/// Stepping SIMPLEC solver.
///
/// ```
/// use lidflow_core::{ProgressReport, SimulationParameters};
/// use lidflow_solver::{SolvePhase, Solver};
///
/// let params = SimulationParameters::new(100.0).with_grid(10, 10).with_max_iter(5);
/// let mut solver = Solver::new(&params).unwrap();
/// let mut ignore = |_: &ProgressReport| {};
/// while !solver.step(&mut ignore).unwrap().is_terminal() {}
/// assert_eq!(solver.phase(), SolvePhase::Exhausted);
/// let result = solver.finish();
/// assert_eq!(result.total_iterations, 5);
/// ```
///
/// If [`step()`](Solver::step) returns an error the grid is left
/// part-way through an iteration and the solver should be dropped.
pub struct Solver {
    params: SimulationParameters,
    ctx: StageContext,
    grid: StaggeredGrid,
    stages: Vec<Box<dyn Stage>>,
    monitor: ConvergenceMonitor,
    phase: SolvePhase,
    iterations: usize,
    residuals: ResidualPair,
    metrics: IterationMetrics,
    started: Instant,
}

impl Solver {
    /// Allocate a zero-filled grid and the standard pipeline.
    ///
    /// # Errors
    ///
    /// [`SolveError::DegenerateGrid`] if the grid has no interior cells.
    pub fn new(params: &SimulationParameters) -> Result<Self, SolveError> {
        Self::with_pipeline(params, simplec_pipeline())
    }

    /// Like [`new()`](Solver::new) with a caller-supplied pipeline.
    pub fn with_pipeline(
        params: &SimulationParameters,
        stages: Vec<Box<dyn Stage>>,
    ) -> Result<Self, SolveError> {
        let geometry = GridGeometry::new(params.nx, params.ny)?;
        tracing::info!(
            reynolds = params.reynolds_number,
            nx = params.nx,
            ny = params.ny,
            max_iter = params.max_iter,
            tolerance = params.tolerance,
            mode = ?params.coefficient_mode,
            "solve started"
        );
        Ok(Self {
            params: params.clone(),
            ctx: StageContext::from_params(params),
            grid: StaggeredGrid::new(geometry),
            stages,
            monitor: ConvergenceMonitor::new(params.tolerance, params.max_iter),
            phase: SolvePhase::Initialized,
            iterations: 0,
            residuals: ResidualPair {
                u: f64::INFINITY,
                v: f64::INFINITY,
            },
            metrics: IterationMetrics::default(),
            started: Instant::now(),
        })
    }

    /// Run one outer iteration and return the new phase.
    ///
    /// A terminal solver is left untouched. With a zero iteration budget
    /// the first call moves straight to `Exhausted`.
    ///
    /// # Errors
    ///
    /// [`SolveError::StageFailed`] if a stage fails or leaves a grid array
    /// with the wrong shape.
    pub fn step(&mut self, sink: &mut dyn ProgressSink) -> Result<SolvePhase, SolveError> {
        if self.phase.is_terminal() {
            return Ok(self.phase);
        }
        if self.iterations >= self.params.max_iter {
            self.phase = SolvePhase::Exhausted;
            return Ok(self.phase);
        }
        let iteration_start = Instant::now();

        // 1. Remember where this iteration started.
        self.grid.snapshot_velocities();

        // 2. Run the pipeline.
        self.metrics.stage_us.clear();
        for stage in &self.stages {
            let stage_start = Instant::now();
            let fail = |reason| SolveError::StageFailed {
                stage: stage.name().to_string(),
                reason,
            };
            stage.apply(&mut self.grid, &self.ctx).map_err(fail)?;
            self.grid.check_shapes().map_err(fail)?;
            let us = stage_start.elapsed().as_micros() as u64;
            tracing::trace!(stage = stage.name(), us, "stage complete");
            self.metrics.stage_us.push((stage.name().to_string(), us));
        }

        // 3. Residuals and the stop decision.
        let monitor_start = Instant::now();
        let (u_old, v_old) = self.grid.previous_velocities();
        let residuals = ResidualPair {
            u: residual(self.grid.u(), u_old),
            v: residual(self.grid.v(), v_old),
        };
        let verdict = self.monitor.observe(self.iterations, residuals, sink);
        self.metrics.monitor_us = monitor_start.elapsed().as_micros() as u64;

        self.iterations += 1;
        self.residuals = residuals;
        self.phase = match verdict {
            Verdict::Continue => SolvePhase::Iterating,
            Verdict::Converged => SolvePhase::Converged,
            Verdict::Exhausted => SolvePhase::Exhausted,
        };
        self.metrics.total_us = iteration_start.elapsed().as_micros() as u64;
        tracing::trace!(
            iteration = self.iterations,
            total_us = self.metrics.total_us,
            stages_us = self.metrics.stages_total_us(),
            monitor_us = self.metrics.monitor_us,
            "iteration complete"
        );
        Ok(self.phase)
    }

    /// Current phase.
    pub fn phase(&self) -> SolvePhase {
        self.phase
    }

    /// Number of outer iterations executed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Residuals of the last iteration; infinite before the first.
    pub fn residuals(&self) -> ResidualPair {
        self.residuals
    }

    /// Timings of the most recent iteration.
    pub fn last_metrics(&self) -> &IterationMetrics {
        &self.metrics
    }

    /// Parameters this solve was created with.
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Read-only view of the working grid.
    pub fn grid(&self) -> &StaggeredGrid {
        &self.grid
    }

    /// Seconds since the solver was created.
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Consume the solver and assemble the result.
    ///
    /// Callable in any phase; `converged` is `true` only in
    /// [`SolvePhase::Converged`].
    pub fn finish(self) -> SolveResult {
        let elapsed_time = self.elapsed();
        let converged = self.phase == SolvePhase::Converged;
        tracing::info!(
            iterations = self.iterations,
            converged,
            residual_u = self.residuals.u,
            residual_v = self.residuals.v,
            elapsed_time,
            "solve finished"
        );
        let geometry = self.grid.geometry;
        let (pressure, velocity_u, velocity_v) = self.grid.into_fields();
        SolveResult {
            pressure,
            velocity_u,
            velocity_v,
            x_coords: geometry.x_coords(),
            y_coords: geometry.y_coords(),
            convergence_history: self.monitor.into_history(),
            final_residuals: self.residuals,
            total_iterations: self.iterations,
            elapsed_time,
            converged,
        }
    }
}

/// Solve lid-driven cavity flow for `params`.
///
/// `progress`, if given, is called synchronously every tenth iteration.
/// Its failures are logged and never abort the solve. Non-convergence is
/// reported through [`SolveResult::converged`], not as an error.
///
/// ```
/// use lidflow_core::{ProgressReport, SimulationParameters};
///
/// let params = SimulationParameters::new(100.0).with_grid(10, 10).with_max_iter(20);
/// let mut calls = 0;
/// let mut count = |_: &ProgressReport| calls += 1;
/// let result = lidflow_solver::solve(&params, Some(&mut count)).unwrap();
/// assert_eq!(result.velocity_u.shape(), (10, 9));
/// assert_eq!(calls, 2);
/// ```
///
/// # Errors
///
/// [`SolveError::DegenerateGrid`] for grids with fewer than three nodes in
/// either direction; [`SolveError::StageFailed`] if a stage fails.
pub fn solve(
    params: &SimulationParameters,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<SolveResult, SolveError> {
    let mut discard = |_: &ProgressReport| {};
    let sink: &mut dyn ProgressSink = match progress {
        Some(sink) => sink,
        None => &mut discard,
    };
    let mut solver = Solver::new(params)?;
    while !solver.step(sink)?.is_terminal() {}
    Ok(solver.finish())
}
