use chrono::{NaiveDate, NaiveTime};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Job, JobStatus, SeriesCancellation, UpdateJobData};
use crate::repository::JobStore;

/// Cancellation, expiry and per-instance status changes for jobs and series.
pub struct SeriesManager<S: JobStore> {
    store: Arc<S>,
}

impl<S: JobStore> SeriesManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    async fn load(&self, id: Uuid) -> Result<Job, CoreError> {
        self.store
            .find_job_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Moves a job to `to`, enforcing the status state machine.
    ///
    /// The write only lands if the stored status still equals the one `job`
    /// was loaded with, so a concurrent change is reported rather than
    /// overwritten.
    async fn transition(&self, job: Job, to: JobStatus) -> Result<Job, CoreError> {
        if job.status == to && to == JobStatus::Cancelled {
            return Ok(job);
        }
        if !job.status.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                id: job.id,
                from: job.status,
                to,
            });
        }
        match self
            .store
            .update_job(job.id, UpdateJobData::transition(job.status, to))
            .await
        {
            Err(CoreError::InvalidTransition {
                from: JobStatus::Cancelled,
                ..
            }) if to == JobStatus::Cancelled => self.load(job.id).await,
            result => result,
        }
    }

    async fn cancel_one(&self, id: Uuid) -> Result<Job, CoreError> {
        let job = self.load(id).await?;
        if job.is_series_root() {
            return Err(CoreError::InvalidInput(format!(
                "Job {} is a series root; cancel the series instead",
                id
            )));
        }
        self.transition(job, JobStatus::Cancelled).await
    }

    /// Cancels each job in `ids`, leaving siblings and series roots alone.
    ///
    /// Updates run concurrently and are all awaited. If any fail, the
    /// successful ones stay cancelled and a
    /// [`CoreError::PartialCancellation`] lists the failures.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn cancel_instances(&self, ids: &[Uuid]) -> Result<usize, CoreError> {
        let results = join_all(ids.iter().map(|id| self.cancel_one(*id))).await;

        let mut cancelled = 0;
        let mut failed = Vec::new();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(_) => cancelled += 1,
                Err(e) => {
                    warn!(job_id = %id, error = %e, "failed to cancel job");
                    failed.push((*id, e.to_string()));
                }
            }
        }

        if failed.is_empty() {
            Ok(cancelled)
        } else {
            Err(CoreError::PartialCancellation { cancelled, failed })
        }
    }

    /// Cancels every open instance of a series and stops its materialization.
    ///
    /// Completed instances are left as they are.
    #[instrument(skip(self))]
    pub async fn cancel_series(&self, root_id: Uuid) -> Result<SeriesCancellation, CoreError> {
        let root = self.load(root_id).await?;
        if !root.is_series_root() {
            return Err(CoreError::InvalidInput(format!(
                "Job {} is not a recurring series",
                root_id
            )));
        }

        // Stop the series first so a concurrent run cannot add instances behind us.
        let mut root_update = UpdateJobData::stop_recurring();
        if !root.status.is_terminal() {
            root_update.status = Some(JobStatus::Cancelled);
            root_update.expected_status = Some(root.status);
        }
        self.store.update_job(root_id, root_update).await?;

        let open: Vec<Uuid> = self
            .store
            .find_instances(root_id)
            .await?
            .into_iter()
            .filter(|instance| !instance.status.is_terminal())
            .map(|instance| instance.id)
            .collect();
        let cancelled = self.cancel_instances(&open).await?;

        info!(series_id = %root_id, cancelled, "series cancelled");
        Ok(SeriesCancellation {
            series_id: root_id,
            cancelled,
        })
    }

    /// Stops every active series whose end date is before `today`.
    ///
    /// Returns the ids of the roots that were switched off.
    #[instrument(skip(self))]
    pub async fn expire_series(&self, today: NaiveDate) -> Result<Vec<Uuid>, CoreError> {
        let mut expired = Vec::new();

        for root in self.store.find_active_series_roots().await? {
            let end = match root.end_condition() {
                Ok(end) => end,
                Err(e) => {
                    warn!(series_id = %root.id, error = %e, "unreadable end condition, skipping");
                    continue;
                }
            };
            if end.is_some_and(|end| end.has_passed(today)) {
                self.store
                    .update_job(root.id, UpdateJobData::stop_recurring())
                    .await?;
                expired.push(root.id);
            }
        }

        if !expired.is_empty() {
            info!(count = expired.len(), "expired finished series");
        }
        Ok(expired)
    }

    pub async fn start_job(&self, id: Uuid) -> Result<Job, CoreError> {
        let job = self.load(id).await?;
        self.transition(job, JobStatus::InProgress).await
    }

    pub async fn complete_job(&self, id: Uuid) -> Result<Job, CoreError> {
        let job = self.load(id).await?;
        self.transition(job, JobStatus::Completed).await
    }

    /// Moves a single open instance or standalone job to another date, and
    /// optionally another time. Series roots cannot be moved.
    ///
    /// Only the visit's date changes; the grid date it was generated for is
    /// kept, so later materialization runs are unaffected.
    pub async fn reschedule_instance(
        &self,
        id: Uuid,
        date: NaiveDate,
        time: Option<NaiveTime>,
    ) -> Result<Job, CoreError> {
        let job = self.load(id).await?;
        if job.is_series_root() {
            return Err(CoreError::InvalidInput(format!(
                "Job {} is a series root and cannot be rescheduled",
                id
            )));
        }
        if job.status.is_terminal() {
            return Err(CoreError::InvalidInput(format!(
                "Job {} is {} and cannot be rescheduled",
                id, job.status
            )));
        }
        if let Some(parent_id) = job.parent_job_id {
            let taken = self.store.find_instances(parent_id).await?.into_iter().any(|sibling| {
                sibling.id != id
                    && sibling.scheduled_date == date
                    && sibling.status != JobStatus::Cancelled
            });
            if taken {
                return Err(CoreError::InvalidInput(format!(
                    "Series {} already has a visit on {}",
                    parent_id, date
                )));
            }
        }

        let update = UpdateJobData {
            scheduled_date: Some(date),
            scheduled_time: time.map(Some),
            ..Default::default()
        };
        self.store.update_job(id, update).await
    }
}
