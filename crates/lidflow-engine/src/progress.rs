//! Progress events and their fan-out to subscribers.
//!
//! The solver reports synchronously on its worker thread. [`ChannelSink`]
//! turns each report into a [`ProgressEvent`] and hands it to every
//! subscriber over a bounded crossbeam channel with `try_send`, so a slow
//! or vanished subscriber never stalls the solve.

use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use lidflow_core::{ProgressError, ProgressReport, ProgressSink};

use crate::job::JobId;

/// Notification delivered to job subscribers.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// A sampled iteration.
    Progress {
        /// The job.
        job_id: JobId,
        /// Zero-based iteration index.
        iteration: usize,
        /// Residual of `u`.
        residual_u: f64,
        /// Residual of `v`.
        residual_v: f64,
        /// Seconds since the solve started.
        elapsed_time: f64,
        /// Seconds until the iteration budget runs out at the current rate.
        estimated_remaining: f64,
    },
    /// The solve finished and its result is stored.
    Completed {
        /// The job.
        job_id: JobId,
        /// Whether the tolerance was met.
        converged: bool,
        /// Iterations executed.
        total_iterations: usize,
    },
    /// The solve failed.
    Failed {
        /// The job.
        job_id: JobId,
        /// What went wrong.
        message: String,
    },
    /// The job was cancelled.
    Cancelled {
        /// The job.
        job_id: JobId,
        /// Iterations executed before stopping.
        iterations: usize,
    },
}

impl ProgressEvent {
    /// The job this event belongs to.
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Progress { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. }
            | Self::Cancelled { job_id, .. } => *job_id,
        }
    }

    /// Returns `true` for the last event a job ever emits.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Linear extrapolation of the remaining time to exhaust `max_iter`.
pub fn estimate_remaining(elapsed_time: f64, iteration: usize, max_iter: usize) -> f64 {
    let done = iteration + 1;
    let left = max_iter.saturating_sub(done);
    elapsed_time / done as f64 * left as f64
}

/// Outcome of one [`Subscribers::broadcast`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Delivery {
    /// Subscribers still connected.
    pub(crate) live: usize,
    /// Subscribers removed because their receiver was dropped.
    pub(crate) pruned: usize,
}

/// The subscriber list of one job.
#[derive(Debug)]
pub(crate) struct Subscribers {
    senders: Mutex<Vec<Sender<ProgressEvent>>>,
    capacity: usize,
}

impl Subscribers {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Register a new subscriber, optionally seeded with an event.
    pub(crate) fn subscribe(&self, seed: Option<ProgressEvent>) -> Receiver<ProgressEvent> {
        let (tx, rx) = crossbeam_channel::bounded(self.capacity);
        if let Some(event) = seed {
            // Fresh channel with capacity >= 1: cannot be full.
            let _ = tx.try_send(event);
        }
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber.
    ///
    /// Full channels drop the event; disconnected ones are pruned.
    pub(crate) fn broadcast(&self, event: &ProgressEvent) -> Delivery {
        let mut senders = self.senders.lock().unwrap_or_else(PoisonError::into_inner);
        let before = senders.len();
        senders.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
        Delivery {
            live: senders.len(),
            pruned: before - senders.len(),
        }
    }

    /// Drop every sender so receivers see the end of the stream.
    pub(crate) fn close(&self) {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.senders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// [`ProgressSink`] that fans reports out as [`ProgressEvent::Progress`].
pub(crate) struct ChannelSink<'a> {
    job_id: JobId,
    max_iter: usize,
    subscribers: &'a Subscribers,
}

impl<'a> ChannelSink<'a> {
    pub(crate) fn new(job_id: JobId, max_iter: usize, subscribers: &'a Subscribers) -> Self {
        Self {
            job_id,
            max_iter,
            subscribers,
        }
    }
}

impl ProgressSink for ChannelSink<'_> {
    fn report(&mut self, progress: &ProgressReport) -> Result<(), ProgressError> {
        let event = ProgressEvent::Progress {
            job_id: self.job_id,
            iteration: progress.iteration,
            residual_u: progress.residual_u,
            residual_v: progress.residual_v,
            elapsed_time: progress.elapsed_time,
            estimated_remaining: estimate_remaining(
                progress.elapsed_time,
                progress.iteration,
                self.max_iter,
            ),
        };
        let delivery = self.subscribers.broadcast(&event);
        if delivery.live == 0 && delivery.pruned > 0 {
            return Err(ProgressError::Disconnected);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(iteration: usize) -> ProgressReport {
        ProgressReport {
            iteration,
            residual_u: 0.5,
            residual_v: 0.25,
            elapsed_time: 2.0,
        }
    }

    #[test]
    fn eta_extrapolates_linearly() {
        // 10 iterations in 2 s, 90 left.
        assert!((estimate_remaining(2.0, 9, 100) - 18.0).abs() < 1e-12);
        assert_eq!(estimate_remaining(2.0, 99, 100), 0.0);
        assert_eq!(estimate_remaining(2.0, 150, 100), 0.0);
    }

    #[test]
    fn sink_fans_out_to_all_subscribers() {
        let subs = Subscribers::new(8);
        let a = subs.subscribe(None);
        let b = subs.subscribe(None);
        let id = JobId::next();
        let mut sink = ChannelSink::new(id, 100, &subs);
        sink.report(&report(9)).unwrap();
        for rx in [&a, &b] {
            match rx.try_recv().unwrap() {
                ProgressEvent::Progress {
                    job_id,
                    iteration,
                    estimated_remaining,
                    ..
                } => {
                    assert_eq!(job_id, id);
                    assert_eq!(iteration, 9);
                    assert!((estimated_remaining - 18.0).abs() < 1e-12);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[test]
    fn disconnected_subscribers_are_pruned() {
        let subs = Subscribers::new(8);
        let keep = subs.subscribe(None);
        drop(subs.subscribe(None));
        assert_eq!(subs.len(), 2);
        let mut sink = ChannelSink::new(JobId::next(), 100, &subs);
        sink.report(&report(0)).unwrap();
        assert_eq!(subs.len(), 1);
        drop(keep);
        assert_eq!(sink.report(&report(10)), Err(ProgressError::Disconnected));
        assert_eq!(subs.len(), 0);
        // Nobody listening is not a failure.
        assert_eq!(sink.report(&report(20)), Ok(()));
    }

    #[test]
    fn full_channel_drops_events_without_blocking() {
        let subs = Subscribers::new(1);
        let rx = subs.subscribe(None);
        let mut sink = ChannelSink::new(JobId::next(), 100, &subs);
        sink.report(&report(0)).unwrap();
        sink.report(&report(10)).unwrap();
        assert_eq!(rx.len(), 1);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn seeded_subscription_and_close() {
        let subs = Subscribers::new(4);
        let id = JobId::next();
        let rx = subs.subscribe(Some(ProgressEvent::Cancelled {
            job_id: id,
            iterations: 3,
        }));
        let event = rx.recv().unwrap();
        assert!(event.is_final());
        assert_eq!(event.job_id(), id);
        subs.close();
        assert!(rx.recv().is_err());
    }
}
