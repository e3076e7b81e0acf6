//! Keyed store of job records and results.
//!
//! Insertion-ordered so listings come back in submission order. Once a job
//! is running, only its worker writes its entry.

use std::sync::Arc;

use indexmap::IndexMap;
use lidflow_core::SolveResult;

use crate::job::{JobError, JobId, JobRecord, JobStatus};

#[derive(Debug)]
struct Entry {
    record: JobRecord,
    result: Option<Arc<SolveResult>>,
}

/// Job records and their results.
#[derive(Debug, Default)]
pub struct JobRegistry {
    entries: IndexMap<JobId, Entry>,
}

impl JobRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no jobs are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a new record. Replaces nothing: ids are unique.
    pub fn insert(&mut self, record: JobRecord) {
        self.entries.insert(
            record.id,
            Entry {
                record,
                result: None,
            },
        );
    }

    /// Record of `id`.
    pub fn get(&self, id: JobId) -> Result<&JobRecord, JobError> {
        self.entries
            .get(&id)
            .map(|e| &e.record)
            .ok_or(JobError::NotFound { id })
    }

    /// All records in submission order.
    pub fn records(&self) -> impl Iterator<Item = &JobRecord> {
        self.entries.values().map(|e| &e.record)
    }

    /// Move `id` to `next`.
    pub fn transition(&mut self, id: JobId, next: JobStatus) -> Result<(), JobError> {
        self.entry_mut(id)?.record.transition(next)
    }

    /// Mark `id` failed with `message`.
    pub fn fail(&mut self, id: JobId, message: String) -> Result<(), JobError> {
        let entry = self.entry_mut(id)?;
        entry.record.transition(JobStatus::Failed)?;
        entry.record.error_message = Some(message);
        Ok(())
    }

    /// Store the result of `id` and mark it completed.
    pub fn complete(&mut self, id: JobId, result: SolveResult) -> Result<(), JobError> {
        let entry = self.entry_mut(id)?;
        entry.record.transition(JobStatus::Completed)?;
        entry.record.iterations = result.total_iterations;
        entry.result = Some(Arc::new(result));
        Ok(())
    }

    /// Mark `id` cancelled after `iterations` outer iterations.
    pub fn cancel(&mut self, id: JobId, iterations: usize) -> Result<(), JobError> {
        let entry = self.entry_mut(id)?;
        entry.record.transition(JobStatus::Cancelled)?;
        entry.record.iterations = iterations;
        Ok(())
    }

    /// Result of a completed job.
    pub fn result(&self, id: JobId) -> Result<Arc<SolveResult>, JobError> {
        let entry = self.entries.get(&id).ok_or(JobError::NotFound { id })?;
        entry.result.clone().ok_or(JobError::NotFinished {
            id,
            status: entry.record.status,
        })
    }

    /// Remove a job that is not running, returning its record.
    pub fn remove(&mut self, id: JobId) -> Result<JobRecord, JobError> {
        let status = self.get(id)?.status;
        if status == JobStatus::Running {
            return Err(JobError::StillRunning { id });
        }
        self.entries
            .shift_remove(&id)
            .map(|e| e.record)
            .ok_or(JobError::NotFound { id })
    }

    fn entry_mut(&mut self, id: JobId) -> Result<&mut Entry, JobError> {
        self.entries.get_mut(&id).ok_or(JobError::NotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lidflow_core::{Field2, ResidualPair, SimulationParameters};

    fn record() -> JobRecord {
        JobRecord::new(JobId::next(), SimulationParameters::new(100.0))
    }

    fn dummy_result() -> SolveResult {
        SolveResult {
            pressure: Field2::zeros(3, 3),
            velocity_u: Field2::zeros(3, 2),
            velocity_v: Field2::zeros(2, 3),
            x_coords: vec![0.0, 0.5, 1.0],
            y_coords: vec![0.0, 0.5, 1.0],
            convergence_history: Vec::new(),
            final_residuals: ResidualPair { u: 0.0, v: 0.0 },
            total_iterations: 1,
            elapsed_time: 0.0,
            converged: true,
        }
    }

    #[test]
    fn preserves_submission_order() {
        let mut reg = JobRegistry::new();
        let ids: Vec<JobId> = (0..4)
            .map(|_| {
                let r = record();
                let id = r.id;
                reg.insert(r);
                id
            })
            .collect();
        let listed: Vec<JobId> = reg.records().map(|r| r.id).collect();
        assert_eq!(listed, ids);
        assert_eq!(reg.len(), 4);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let reg = JobRegistry::new();
        let id = JobId::next();
        assert_eq!(reg.get(id).unwrap_err(), JobError::NotFound { id });
        assert!(matches!(reg.result(id), Err(JobError::NotFound { .. })));
    }

    #[test]
    fn result_only_after_completion() {
        let mut reg = JobRegistry::new();
        let r = record();
        let id = r.id;
        reg.insert(r);
        assert_eq!(
            reg.result(id).unwrap_err(),
            JobError::NotFinished {
                id,
                status: JobStatus::Pending
            }
        );
        reg.transition(id, JobStatus::Running).unwrap();
        reg.complete(id, dummy_result()).unwrap();
        assert_eq!(reg.get(id).unwrap().status, JobStatus::Completed);
        assert_eq!(reg.get(id).unwrap().iterations, 1);
        assert!(reg.result(id).unwrap().converged);
    }

    #[test]
    fn fail_records_message() {
        let mut reg = JobRegistry::new();
        let r = record();
        let id = r.id;
        reg.insert(r);
        // Pending jobs cannot fail directly.
        assert!(reg.fail(id, "x".into()).is_err());
        reg.transition(id, JobStatus::Running).unwrap();
        reg.fail(id, "diverged".into()).unwrap();
        let rec = reg.get(id).unwrap();
        assert_eq!(rec.status, JobStatus::Failed);
        assert_eq!(rec.error_message.as_deref(), Some("diverged"));
    }

    #[test]
    fn running_jobs_cannot_be_removed() {
        let mut reg = JobRegistry::new();
        let r = record();
        let id = r.id;
        reg.insert(r);
        reg.transition(id, JobStatus::Running).unwrap();
        assert_eq!(reg.remove(id).unwrap_err(), JobError::StillRunning { id });
        reg.cancel(id, 7).unwrap();
        let removed = reg.remove(id).unwrap();
        assert_eq!(removed.status, JobStatus::Cancelled);
        assert_eq!(removed.iterations, 7);
        assert!(reg.is_empty());
    }
}
