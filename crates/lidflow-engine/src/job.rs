//! Job identifiers, lifecycle states, and per-job records.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use lidflow_core::SimulationParameters;

use crate::config::ConfigError;

/// Counter for unique [`JobId`] allocation.
static JOB_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a submitted solve.
///
/// Allocated from a process-wide monotonic counter, so ids are never
/// reused even across services.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Allocate a fresh, unique id. Thread-safe.
    pub fn next() -> Self {
        Self(JOB_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw counter value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Lifecycle state of a job.
///
/// `Pending → Running → {Completed, Failed, Cancelled}`. A pending job may
/// also be cancelled before it starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Created, not yet started.
    Pending,
    /// A worker is solving it.
    Running,
    /// The solve returned a result (converged or not).
    Completed,
    /// The solve returned an error or the worker panicked.
    Failed,
    /// Stopped on request before finishing.
    Cancelled,
}

impl JobStatus {
    /// Whether the job has reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Cancelled)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Failed)
                | (Self::Running, Self::Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Everything known about a job except its result.
#[derive(Clone, Debug)]
pub struct JobRecord {
    /// Job identifier.
    pub id: JobId,
    /// Validated input.
    pub params: SimulationParameters,
    /// Current state.
    pub status: JobStatus,
    /// When the job was created.
    pub created_at: SystemTime,
    /// When a worker picked it up.
    pub started_at: Option<SystemTime>,
    /// When it reached a terminal state.
    pub completed_at: Option<SystemTime>,
    /// Failure description, set only for `Failed`.
    pub error_message: Option<String>,
    /// Outer iterations executed, set when the job ends.
    pub iterations: usize,
}

impl JobRecord {
    /// A new `Pending` record.
    pub fn new(id: JobId, params: SimulationParameters) -> Self {
        Self {
            id,
            params,
            status: JobStatus::Pending,
            created_at: SystemTime::now(),
            started_at: None,
            completed_at: None,
            error_message: None,
            iterations: 0,
        }
    }

    /// Move to `next`, stamping the matching timestamp.
    pub fn transition(&mut self, next: JobStatus) -> Result<(), JobError> {
        if !self.status.can_transition_to(next) {
            return Err(JobError::InvalidTransition {
                id: self.id,
                from: self.status,
                to: next,
            });
        }
        let now = SystemTime::now();
        if next == JobStatus::Running {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.completed_at = Some(now);
        }
        self.status = next;
        Ok(())
    }
}

// ── JobError ───────────────────────────────────────────────────────

/// Errors from the job registry and service.
#[derive(Clone, Debug, PartialEq)]
pub enum JobError {
    /// No job with this id.
    NotFound {
        /// The unknown id.
        id: JobId,
    },
    /// The requested state change is not allowed.
    InvalidTransition {
        /// The job.
        id: JobId,
        /// Its current state.
        from: JobStatus,
        /// The rejected target state.
        to: JobStatus,
    },
    /// The parameters failed validation.
    Config(ConfigError),
    /// The worker thread could not be spawned.
    ThreadSpawnFailed {
        /// OS error description.
        reason: String,
    },
    /// The job has no result yet.
    NotFinished {
        /// The job.
        id: JobId,
        /// Its current state.
        status: JobStatus,
    },
    /// The job is running and cannot be removed.
    StillRunning {
        /// The job.
        id: JobId,
    },
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "{id} not found"),
            Self::InvalidTransition { id, from, to } => {
                write!(f, "{id}: cannot move from {from} to {to}")
            }
            Self::Config(e) => write!(f, "invalid parameters: {e}"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::NotFinished { id, status } => {
                write!(f, "{id} has not completed, current status: {status}")
            }
            Self::StillRunning { id } => write!(f, "{id} is running and cannot be removed"),
        }
    }
}

impl Error for JobError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for JobError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
