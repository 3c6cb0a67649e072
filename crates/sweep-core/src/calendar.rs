use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

use crate::conflicts::detect_conflicts;
use crate::error::CoreError;
use crate::models::{Conflict, Job};
use crate::repository::JobStore;

/// One calendar day: its bookings and the overlaps among them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub jobs: Vec<Job>,
    pub conflicts: Vec<Conflict>,
}

impl DaySchedule {
    pub fn new(date: NaiveDate, jobs: Vec<Job>) -> Self {
        let conflicts = detect_conflicts(&jobs);
        Self {
            date,
            jobs,
            conflicts,
        }
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

/// Drops series roots whose own date is already covered by one of their
/// instances, so the same visit is not booked twice.
pub fn bookable_jobs(jobs: Vec<Job>) -> Vec<Job> {
    let covered: HashSet<(Uuid, NaiveDate)> = jobs
        .iter()
        .filter_map(|j| j.parent_job_id.map(|parent| (parent, j.scheduled_date)))
        .collect();

    jobs.into_iter()
        .filter(|j| !(j.is_series_root() && covered.contains(&(j.id, j.scheduled_date))))
        .collect()
}

pub fn group_by_date(jobs: Vec<Job>) -> BTreeMap<NaiveDate, Vec<Job>> {
    let mut days: BTreeMap<NaiveDate, Vec<Job>> = BTreeMap::new();
    for job in jobs {
        days.entry(job.scheduled_date).or_default().push(job);
    }
    days
}

/// Loads the bookings of a single day and checks them for overlaps.
pub async fn day_schedule<S: JobStore + ?Sized>(
    store: &S,
    date: NaiveDate,
) -> Result<DaySchedule, CoreError> {
    let jobs = bookable_jobs(store.find_jobs_between(date, date).await?);
    Ok(DaySchedule::new(date, jobs))
}

/// Day schedules for every date in `[start, end]` that has at least one booking.
pub async fn range_schedule<S: JobStore + ?Sized>(
    store: &S,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DaySchedule>, CoreError> {
    if end < start {
        return Err(CoreError::InvalidInput(format!(
            "Range end {} is before its start {}",
            end, start
        )));
    }
    let jobs = bookable_jobs(store.find_jobs_between(start, end).await?);
    Ok(group_by_date(jobs)
        .into_iter()
        .map(|(date, jobs)| DaySchedule::new(date, jobs))
        .collect())
}
