//! Reusable stage fixtures.
//!
//! - [`FailingStage`]: succeeds N times, then fails deterministically.
//! - [`ReshapingStage`]: replaces `u` with an array of the wrong shape.
//! - [`CountingStage`]: does nothing but count its calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lidflow_core::{Field2, StageError};
use lidflow_solver::{Stage, StageContext, StaggeredGrid};

/// Fails deterministically after a configurable number of successful calls.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send`.
pub struct FailingStage {
    pub name: String,
    pub succeed_count: usize,
    call_count: AtomicUsize,
}

impl FailingStage {
    /// Create a stage that succeeds `succeed_count` times then fails.
    pub fn new(name: impl Into<String>, succeed_count: usize) -> Self {
        Self {
            name: name.into(),
            succeed_count,
            call_count: AtomicUsize::new(0),
        }
    }
}

impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, _grid: &mut StaggeredGrid, _ctx: &StageContext) -> Result<(), StageError> {
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(StageError::ExecutionFailed {
                reason: format!(
                    "deliberate failure after {} successful calls",
                    self.succeed_count
                ),
            });
        }
        Ok(())
    }
}

/// Swaps `u` for a 1×1 array, breaking the staggered layout.
pub struct ReshapingStage;

impl Stage for ReshapingStage {
    fn name(&self) -> &str {
        "reshaping"
    }

    fn apply(&self, grid: &mut StaggeredGrid, _ctx: &StageContext) -> Result<(), StageError> {
        *grid.u_mut() = Field2::zeros(1, 1);
        Ok(())
    }
}

/// Leaves the grid alone and counts calls through a shared counter.
pub struct CountingStage {
    pub calls: Arc<AtomicUsize>,
}

impl CountingStage {
    /// Returns the stage and a handle to its counter.
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl Stage for CountingStage {
    fn name(&self) -> &str {
        "counting"
    }

    fn apply(&self, _grid: &mut StaggeredGrid, _ctx: &StageContext) -> Result<(), StageError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
