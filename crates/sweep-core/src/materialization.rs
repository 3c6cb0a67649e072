use chrono::{Months, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{
    EndCondition, Job, JobStatus, MaterializationConfig, MaterializationReport, SeriesResult,
    UpdateJobData,
};
use crate::recurrence::RecurrenceRule;
use crate::repository::JobStore;

/// InstanceMaterializer: turns series roots into dated job instances.
///
/// Responsibilities:
/// 1. Keep every active series materialized up to a rolling horizon
/// 2. Re-derive the next needed date from persisted state on every run
/// 3. Stop a series once its occurrence limit has been materialized
/// 4. Isolate failures so one broken series never blocks the others
pub struct InstanceMaterializer<S: JobStore> {
    store: Arc<S>,
    config: MaterializationConfig,
}

impl<S: JobStore> InstanceMaterializer<S> {
    pub fn new(store: Arc<S>, config: MaterializationConfig) -> Self {
        Self { store, config }
    }

    /// Creates an InstanceMaterializer with default configuration.
    pub fn with_defaults(store: Arc<S>) -> Self {
        Self::new(store, MaterializationConfig::default())
    }

    /// Gets the current configuration.
    pub fn config(&self) -> &MaterializationConfig {
        &self.config
    }

    /// Last date instances are generated for when the run happens on `today`.
    pub fn horizon_end(&self, today: NaiveDate) -> Result<NaiveDate, CoreError> {
        today
            .checked_add_months(Months::new(self.config.horizon_months))
            .ok_or_else(|| {
                CoreError::InvalidInput(format!(
                    "Horizon of {} months from {} is out of range",
                    self.config.horizon_months, today
                ))
            })
    }

    /// Materializes every active series root.
    ///
    /// Only a failure to list the roots aborts the run. Errors inside a single
    /// series are recorded in that series' result entry.
    #[instrument(skip(self))]
    pub async fn run(&self, today: NaiveDate) -> Result<MaterializationReport, CoreError> {
        let roots = self.store.find_active_series_roots().await?;
        let mut report = MaterializationReport {
            processed_count: roots.len(),
            results: Vec::with_capacity(roots.len()),
        };

        for root in &roots {
            let result = match self.materialize_series(root, today).await {
                Ok(instances_created) => SeriesResult::Success {
                    series_id: root.id,
                    instances_created,
                },
                Err(e) => {
                    warn!(series_id = %root.id, error = %e, "failed to materialize series");
                    SeriesResult::Error {
                        series_id: root.id,
                        error: e.to_string(),
                    }
                }
            };
            report.results.push(result);
        }

        info!(
            processed = report.processed_count,
            created = report.instances_created(),
            failed = report.errors().count(),
            "materialization run finished"
        );
        Ok(report)
    }

    /// Materializes one series root and returns the number of instances written.
    ///
    /// # Behavior
    /// - Skips a series whose end date has passed
    /// - Skips a series already materialized up to the horizon
    /// - Anchors generation at `max(today, next grid date after the latest materialized one)`
    /// - Writes at most `max_batch_size` instances
    /// - Turns recurrence off on the root once an occurrence limit is reached
    pub async fn materialize_series(&self, root: &Job, today: NaiveDate) -> Result<usize, CoreError> {
        let rule = RecurrenceRule::from_job(root)?;

        if rule.is_finished(today) {
            debug!(series_id = %root.id, "series end date passed, skipping");
            return Ok(0);
        }

        let horizon_end = self.horizon_end(today)?;
        let latest = self.store.find_latest_instance_date(root.id).await?;

        if latest.is_some_and(|latest| latest >= horizon_end) {
            debug!(series_id = %root.id, %horizon_end, "series already materialized to horizon");
            return Ok(0);
        }

        let anchor = match latest {
            Some(latest) => match rule.next_after(latest) {
                Some(next) => next.max(today),
                None => return Ok(0),
            },
            None => today,
        };

        let existing = self.store.count_instances(root.id).await?;
        let mut dates = rule.dates(anchor, horizon_end, existing);
        dates.truncate(self.config.max_batch_size);

        let instances: Vec<Job> = dates.iter().map(|date| instance_of(root, *date)).collect();
        let created = self.store.insert_instances(instances).await?;

        if let Some(EndCondition::Occurrences { limit }) = rule.end {
            if existing + created >= limit as usize {
                self.store
                    .update_job(root.id, UpdateJobData::stop_recurring())
                    .await?;
                info!(series_id = %root.id, limit, "occurrence limit reached, series stopped");
            }
        }

        debug!(series_id = %root.id, %anchor, created, "series materialized");
        Ok(created)
    }
}

/// Copies the template fields of a series root onto a new dated instance.
fn instance_of(root: &Job, date: NaiveDate) -> Job {
    let now = Utc::now();
    Job {
        id: Uuid::new_v4(),
        title: root.title.clone(),
        client_name: root.client_name.clone(),
        service_type: root.service_type.clone(),
        address: root.address.clone(),
        price: root.price,
        notes: root.notes.clone(),
        scheduled_date: date,
        scheduled_time: root.scheduled_time,
        estimated_duration: root.estimated_duration,
        status: JobStatus::Scheduled,
        is_recurring: false,
        recurring_frequency: None,
        recurring_end_type: None,
        recurring_end_date: None,
        recurring_occurrences: None,
        parent_job_id: Some(root.id),
        occurrence_date: Some(date),
        created_at: now,
        updated_at: now,
    }
}
