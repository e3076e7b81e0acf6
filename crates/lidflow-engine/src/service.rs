//! User-facing [`SolverService`]: job submission, workers, cancellation.
//!
//! # Architecture
//!
//! ```text
//! Caller thread(s)                 Worker thread (one per job)
//!     |                                 |
//!     |--create_job()  registry: Pending
//!     |--start_job()   registry: Running
//!     |   spawn "lidflow-solve-<id>" -->| Solver::new()
//!     |                                 | loop:
//!     |--subscribe() -> Receiver        |   cancel flag?  -> Cancelled
//!     |<------- ProgressEvent ----------|   solver.step(ChannelSink)
//!     |   [bounded, try_send]           | finish() -> registry: Completed
//!     |--cancel()  sets flag            | error/panic -> registry: Failed
//!     |--wait()    joins worker         | final event, close channels
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use indexmap::IndexMap;
use lidflow_core::{SimulationParameters, SolveError, SolveResult};
use lidflow_solver::Solver;

use crate::config::{ConfigError, ServiceConfig};
use crate::job::{JobError, JobId, JobRecord, JobStatus};
use crate::progress::{ChannelSink, ProgressEvent, Subscribers};
use crate::registry::JobRegistry;

/// Per-job plumbing that is not part of the public record.
struct JobHandles {
    cancel: Arc<AtomicBool>,
    subscribers: Arc<Subscribers>,
    worker: Option<JoinHandle<()>>,
}

/// How a worker's solve ended.
enum Outcome {
    Finished(SolveResult),
    Cancelled { iterations: usize },
}

/// Report from [`SolverService::shutdown()`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers that were still attached and were asked to cancel.
    pub cancel_requested: usize,
    /// Worker threads joined.
    pub workers_joined: usize,
}

/// Runs solves on dedicated worker threads and tracks their lifecycle.
///
/// ```no_run
/// use lidflow_core::SimulationParameters;
/// use lidflow_engine::{ProgressEvent, ServiceConfig, SolverService};
///
/// let service = SolverService::new(ServiceConfig::default()).unwrap();
/// let id = service.submit(SimulationParameters::new(100.0).with_grid(21, 21)).unwrap();
/// for event in service.subscribe(id).unwrap() {
///     if let ProgressEvent::Progress { iteration, residual_u, .. } = event {
///         println!("{iteration}: {residual_u:.3e}");
///     }
/// }
/// let result = service.result(id).unwrap();
/// println!("converged: {}", result.converged);
/// ```
pub struct SolverService {
    config: ServiceConfig,
    registry: Arc<Mutex<JobRegistry>>,
    handles: Mutex<IndexMap<JobId, JobHandles>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SolverService {
    /// Create a service with no jobs.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`ServiceConfig::validate()`].
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: Arc::new(Mutex::new(JobRegistry::new())),
            handles: Mutex::new(IndexMap::new()),
        })
    }

    /// The configuration this service was built with.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Validate `params` and record a `Pending` job.
    pub fn create_job(&self, params: SimulationParameters) -> Result<JobId, JobError> {
        self.config.limits.validate(&params)?;
        let id = JobId::next();
        lock(&self.registry).insert(JobRecord::new(id, params));
        lock(&self.handles).insert(
            id,
            JobHandles {
                cancel: Arc::new(AtomicBool::new(false)),
                subscribers: Arc::new(Subscribers::new(self.config.subscriber_capacity)),
                worker: None,
            },
        );
        tracing::info!(%id, "job created");
        Ok(id)
    }

    /// Start the worker for a `Pending` job.
    pub fn start_job(&self, id: JobId) -> Result<(), JobError> {
        let params = {
            let mut registry = lock(&self.registry);
            registry.transition(id, JobStatus::Running)?;
            registry.get(id)?.params.clone()
        };

        let mut handles = lock(&self.handles);
        let job = handles.get_mut(&id).ok_or(JobError::NotFound { id })?;
        let registry = Arc::clone(&self.registry);
        let cancel = Arc::clone(&job.cancel);
        let subscribers = Arc::clone(&job.subscribers);
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", self.config.thread_name_prefix, id.get()))
            .spawn(move || run_job(id, &params, &registry, &cancel, &subscribers));

        match spawned {
            Ok(handle) => {
                job.worker = Some(handle);
                tracing::info!(%id, "job started");
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(%id, error = %reason, "worker spawn failed");
                if let Err(e) = mark_spawn_failed(&mut lock(&self.registry), id, &reason) {
                    tracing::warn!(%id, error = %e, "could not record spawn failure");
                }
                Err(JobError::ThreadSpawnFailed { reason })
            }
        }
    }

    /// [`create_job()`](Self::create_job) followed by
    /// [`start_job()`](Self::start_job).
    pub fn submit(&self, params: SimulationParameters) -> Result<JobId, JobError> {
        let id = self.create_job(params)?;
        self.start_job(id)?;
        Ok(id)
    }

    /// Receive progress and the final event of `id`.
    ///
    /// Subscribing to a job that already ended yields just its final event.
    /// The channel closes after the final event.
    pub fn subscribe(&self, id: JobId) -> Result<Receiver<ProgressEvent>, JobError> {
        let handles = lock(&self.handles);
        let job = handles.get(&id).ok_or(JobError::NotFound { id })?;
        // Workers publish their final event under the registry lock, so a
        // subscriber registered here either sees that event or is seeded
        // with it.
        let registry = lock(&self.registry);
        let seed = final_event(&registry, id)?;
        let ended = seed.is_some();
        let rx = job.subscribers.subscribe(seed);
        if ended {
            job.subscribers.close();
        }
        Ok(rx)
    }

    /// Live subscriber count of `id`.
    pub fn subscriber_count(&self, id: JobId) -> Result<usize, JobError> {
        let handles = lock(&self.handles);
        let job = handles.get(&id).ok_or(JobError::NotFound { id })?;
        Ok(job.subscribers.len())
    }

    /// Cancel `id`.
    ///
    /// A pending job is cancelled at once. A running job stops before its
    /// next iteration; the in-flight iteration always completes.
    pub fn cancel(&self, id: JobId) -> Result<(), JobError> {
        let handles = lock(&self.handles);
        let job = handles.get(&id).ok_or(JobError::NotFound { id })?;
        let mut registry = lock(&self.registry);
        match registry.get(id)?.status {
            JobStatus::Pending => {
                registry.cancel(id, 0)?;
                job.subscribers.broadcast(&ProgressEvent::Cancelled {
                    job_id: id,
                    iterations: 0,
                });
                job.subscribers.close();
                tracing::warn!(%id, "job cancelled before start");
                Ok(())
            }
            JobStatus::Running => {
                job.cancel.store(true, Ordering::Release);
                tracing::debug!(%id, "cancellation requested");
                Ok(())
            }
            from => Err(JobError::InvalidTransition {
                id,
                from,
                to: JobStatus::Cancelled,
            }),
        }
    }

    /// Block until the worker of `id` exits; returns the final status.
    ///
    /// Returns immediately for jobs that never started, or whose worker
    /// another caller is already waiting on.
    pub fn wait(&self, id: JobId) -> Result<JobStatus, JobError> {
        let worker = {
            let mut handles = lock(&self.handles);
            let job = handles.get_mut(&id).ok_or(JobError::NotFound { id })?;
            job.worker.take()
        };
        if let Some(handle) = worker {
            if handle.join().is_err() {
                tracing::error!(%id, "worker thread panicked outside the solve");
            }
        }
        Ok(lock(&self.registry).get(id)?.status)
    }

    /// Snapshot of the record of `id`.
    pub fn job(&self, id: JobId) -> Result<JobRecord, JobError> {
        lock(&self.registry).get(id).cloned()
    }

    /// Snapshots of every record in submission order.
    pub fn jobs(&self) -> Vec<JobRecord> {
        lock(&self.registry).records().cloned().collect()
    }

    /// Result of a completed job.
    pub fn result(&self, id: JobId) -> Result<Arc<SolveResult>, JobError> {
        lock(&self.registry).result(id)
    }

    /// Forget a job that is not running.
    pub fn remove_job(&self, id: JobId) -> Result<JobRecord, JobError> {
        let mut handles = lock(&self.handles);
        let record = lock(&self.registry).remove(id)?;
        if let Some(job) = handles.shift_remove(&id) {
            job.subscribers.close();
            if let Some(worker) = job.worker {
                // Terminal already; the thread is exiting or gone.
                let _ = worker.join();
            }
        }
        tracing::info!(%id, "job removed");
        Ok(record)
    }

    /// Cancel every running job and join all workers.
    pub fn shutdown(&self) -> ShutdownReport {
        let workers: Vec<(JobId, JoinHandle<()>)> = {
            let mut handles = lock(&self.handles);
            handles
                .iter_mut()
                .filter_map(|(&id, job)| {
                    job.worker.take().map(|w| {
                        job.cancel.store(true, Ordering::Release);
                        (id, w)
                    })
                })
                .collect()
        };
        let mut report = ShutdownReport {
            cancel_requested: workers.len(),
            workers_joined: 0,
        };
        for (id, worker) in workers {
            if worker.join().is_ok() {
                report.workers_joined += 1;
            } else {
                tracing::error!(%id, "worker thread panicked outside the solve");
            }
        }
        report
    }
}

impl Drop for SolverService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The terminal event of `id`, if it has ended.
fn final_event(registry: &JobRegistry, id: JobId) -> Result<Option<ProgressEvent>, JobError> {
    let record = registry.get(id)?;
    let event = match record.status {
        JobStatus::Pending | JobStatus::Running => None,
        JobStatus::Completed => {
            let result = registry.result(id)?;
            Some(ProgressEvent::Completed {
                job_id: id,
                converged: result.converged,
                total_iterations: result.total_iterations,
            })
        }
        JobStatus::Failed => Some(ProgressEvent::Failed {
            job_id: id,
            message: record.error_message.clone().unwrap_or_default(),
        }),
        JobStatus::Cancelled => Some(ProgressEvent::Cancelled {
            job_id: id,
            iterations: record.iterations,
        }),
    };
    Ok(event)
}

/// Worker body: solve, record the outcome, notify subscribers.
fn run_job(
    id: JobId,
    params: &SimulationParameters,
    registry: &Mutex<JobRegistry>,
    cancel: &AtomicBool,
    subscribers: &Subscribers,
) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        drive(id, params, cancel, subscribers)
    }));

    // Final event goes out under the registry lock; see `subscribe()`.
    let mut registry = lock(registry);
    let recorded = match outcome {
        Ok(Ok(Outcome::Finished(result))) => {
            let event = ProgressEvent::Completed {
                job_id: id,
                converged: result.converged,
                total_iterations: result.total_iterations,
            };
            tracing::info!(
                %id,
                converged = result.converged,
                iterations = result.total_iterations,
                "job completed"
            );
            registry.complete(id, result).map(|()| event)
        }
        Ok(Ok(Outcome::Cancelled { iterations })) => {
            tracing::warn!(%id, iterations, "job cancelled");
            registry
                .cancel(id, iterations)
                .map(|()| ProgressEvent::Cancelled {
                    job_id: id,
                    iterations,
                })
        }
        Ok(Err(e)) => fail(&mut registry, id, format!("solve failed: {e}")),
        Err(payload) => fail(
            &mut registry,
            id,
            format!("solver panicked: {}", panic_message(payload.as_ref())),
        ),
    };
    let event = match recorded {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(%id, error = %e, "could not record job outcome");
            ProgressEvent::Failed {
                job_id: id,
                message: e.to_string(),
            }
        }
    };
    subscribers.broadcast(&event);
    subscribers.close();
}

fn drive(
    id: JobId,
    params: &SimulationParameters,
    cancel: &AtomicBool,
    subscribers: &Subscribers,
) -> Result<Outcome, SolveError> {
    let mut solver = Solver::new(params)?;
    let mut sink = ChannelSink::new(id, params.max_iter, subscribers);
    loop {
        if cancel.load(Ordering::Acquire) {
            return Ok(Outcome::Cancelled {
                iterations: solver.iterations(),
            });
        }
        if solver.step(&mut sink)?.is_terminal() {
            return Ok(Outcome::Finished(solver.finish()));
        }
    }
}

fn fail(
    registry: &mut JobRegistry,
    id: JobId,
    message: String,
) -> Result<ProgressEvent, JobError> {
    tracing::error!(%id, error = %message, "job failed");
    registry.fail(id, message.clone())?;
    Ok(ProgressEvent::Failed {
        job_id: id,
        message,
    })
}

/// Record that the worker of a running job could not be spawned.
fn mark_spawn_failed(
    registry: &mut JobRegistry,
    id: JobId,
    reason: &str,
) -> Result<(), JobError> {
    registry.fail(id, format!("worker spawn failed: {reason}"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
