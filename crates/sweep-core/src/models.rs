use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::CoreError;

/// Duration assumed for jobs that carry no estimate, in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

/// Longest estimate a single job may carry, in minutes.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    /// Completed and cancelled jobs never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Scheduled, InProgress)
                | (InProgress, Completed)
                | (Scheduled, Cancelled)
                | (InProgress, Cancelled)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Scheduled => write!(f, "scheduled"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid job status: {0}")]
pub struct ParseJobStatusError(String);

impl FromStr for JobStatus {
    type Err = ParseJobStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(JobStatus::Scheduled),
            "in_progress" | "in-progress" | "started" => Ok(JobStatus::InProgress),
            "completed" | "done" => Ok(JobStatus::Completed),
            "cancelled" | "canceled" => Ok(JobStatus::Cancelled),
            _ => Err(ParseJobStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurringFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

impl fmt::Display for RecurringFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurringFrequency::Weekly => write!(f, "weekly"),
            RecurringFrequency::Biweekly => write!(f, "biweekly"),
            RecurringFrequency::Monthly => write!(f, "monthly"),
            RecurringFrequency::Quarterly => write!(f, "quarterly"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid recurring frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for RecurringFrequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(RecurringFrequency::Weekly),
            "biweekly" | "fortnightly" => Ok(RecurringFrequency::Biweekly),
            "monthly" => Ok(RecurringFrequency::Monthly),
            "quarterly" => Ok(RecurringFrequency::Quarterly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// Column-level discriminant for the stored end condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurringEndType {
    Date,
    Occurrences,
}

/// When a recurring series stops producing instances.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EndCondition {
    Date {
        #[serde(rename = "endDate")]
        end_date: NaiveDate,
    },
    Occurrences { limit: u32 },
}

impl EndCondition {
    pub fn end_type(&self) -> RecurringEndType {
        match self {
            EndCondition::Date { .. } => RecurringEndType::Date,
            EndCondition::Occurrences { .. } => RecurringEndType::Occurrences,
        }
    }

    /// True once a date-based condition lies strictly before `today`.
    pub fn has_passed(&self, today: NaiveDate) -> bool {
        matches!(self, EndCondition::Date { end_date } if *end_date < today)
    }
}

/// A unit of scheduled work.
///
/// Series roots have `is_recurring = true` and no parent; instances point at
/// their root through `parent_job_id`; standalone jobs have neither.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub client_name: Option<String>,
    pub service_type: Option<String>,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    /// Minutes
    pub estimated_duration: Option<i64>,
    pub status: JobStatus,
    pub is_recurring: bool,
    pub recurring_frequency: Option<RecurringFrequency>,
    pub recurring_end_type: Option<RecurringEndType>,
    pub recurring_end_date: Option<NaiveDate>,
    pub recurring_occurrences: Option<i64>,
    pub parent_job_id: Option<Uuid>,
    /// Series grid date an instance stands for. Rescheduling moves
    /// `scheduled_date` and leaves this alone.
    pub occurrence_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for Job {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            client_name: None,
            service_type: None,
            address: None,
            price: None,
            notes: None,
            scheduled_date: Utc::now().date_naive(),
            scheduled_time: None,
            estimated_duration: None,
            status: JobStatus::Scheduled,
            is_recurring: false,
            recurring_frequency: None,
            recurring_end_type: None,
            recurring_end_date: None,
            recurring_occurrences: None,
            parent_job_id: None,
            occurrence_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

impl Job {
    pub fn is_series_root(&self) -> bool {
        self.parent_job_id.is_none() && self.recurring_frequency.is_some()
    }

    pub fn is_instance(&self) -> bool {
        self.parent_job_id.is_some()
    }

    pub fn duration_minutes(&self) -> i64 {
        self.estimated_duration
            .filter(|minutes| *minutes > 0)
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    /// Start of the booked window, if the job has a time of day.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_time.map(|t| self.scheduled_date.and_time(t))
    }

    /// End of the booked window. An estimate too large to represent is
    /// clamped to the end of the scheduled day.
    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        let start = self.starts_at()?;
        let end = TimeDelta::try_minutes(self.duration_minutes())
            .and_then(|length| start.checked_add_signed(length));
        Some(end.unwrap_or_else(|| end_of_day(self.scheduled_date)))
    }

    /// Reads the flat `recurring_end_*` columns back into an [`EndCondition`].
    ///
    /// The stored end type wins when present. Without one, a single populated
    /// field is accepted and two populated fields are rejected as ambiguous.
    pub fn end_condition(&self) -> Result<Option<EndCondition>, CoreError> {
        match self.recurring_end_type {
            Some(RecurringEndType::Date) => {
                let end_date = self.recurring_end_date.ok_or_else(|| {
                    CoreError::InvalidInput(format!(
                        "Job {} ends by date but has no end date",
                        self.id
                    ))
                })?;
                Ok(Some(EndCondition::Date { end_date }))
            }
            Some(RecurringEndType::Occurrences) => {
                let limit = self.occurrence_limit()?.ok_or_else(|| {
                    CoreError::InvalidInput(format!(
                        "Job {} ends after a number of occurrences but has no count",
                        self.id
                    ))
                })?;
                Ok(Some(EndCondition::Occurrences { limit }))
            }
            None => match (self.recurring_end_date, self.occurrence_limit()?) {
                (Some(_), Some(_)) => Err(CoreError::InvalidInput(format!(
                    "Job {} sets both an end date and an occurrence count without an end type",
                    self.id
                ))),
                (Some(end_date), None) => Ok(Some(EndCondition::Date { end_date })),
                (None, Some(limit)) => Ok(Some(EndCondition::Occurrences { limit })),
                (None, None) => Ok(None),
            },
        }
    }

    fn occurrence_limit(&self) -> Result<Option<u32>, CoreError> {
        match self.recurring_occurrences {
            None => Ok(None),
            Some(count) if count > 0 => u32::try_from(count)
                .map(Some)
                .map_err(|_| CoreError::InvalidInput(format!("Occurrence count {} is too large", count))),
            Some(count) => Err(CoreError::InvalidInput(format!(
                "Occurrence count must be positive, got {}",
                count
            ))),
        }
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.succ_opt()
        .map(|next| next.and_time(NaiveTime::MIN))
        .unwrap_or(NaiveDateTime::MAX)
}

// ============================================================================
// Data Transfer Objects
// ============================================================================

/// Recurrence settings supplied when creating a series root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecurrence {
    pub frequency: RecurringFrequency,
    /// `None` keeps the series open-ended; the horizon alone bounds generation.
    pub end: Option<EndCondition>,
}

#[derive(Debug, Clone, Default)]
pub struct NewJobData {
    pub title: String,
    pub client_name: Option<String>,
    pub service_type: Option<String>,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub estimated_duration: Option<i64>,
    /// When present the job becomes a series root
    pub recurrence: Option<NewRecurrence>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateJobData {
    pub title: Option<String>,
    pub notes: Option<Option<String>>,
    pub price: Option<Option<f64>>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<Option<NaiveTime>>,
    pub estimated_duration: Option<Option<i64>>,
    pub status: Option<JobStatus>,
    /// Flipping this off stops further materialization for a root
    pub is_recurring: Option<bool>,
    /// When set, the update only applies while the stored status still matches.
    pub expected_status: Option<JobStatus>,
}

impl UpdateJobData {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Status change that only lands if the job is still in `from`.
    pub fn transition(from: JobStatus, to: JobStatus) -> Self {
        Self {
            status: Some(to),
            expected_status: Some(from),
            ..Default::default()
        }
    }

    pub fn stop_recurring() -> Self {
        Self {
            is_recurring: Some(false),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.price.is_none()
            && self.scheduled_date.is_none()
            && self.scheduled_time.is_none()
            && self.estimated_duration.is_none()
            && self.status.is_none()
            && self.is_recurring.is_none()
    }
}

// ============================================================================
// Calendar Conflicts
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Time,
}

/// A detected time-window overlap between jobs on the same date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub job_id: Uuid,
    pub conflicting_job_ids: Vec<Uuid>,
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub description: String,
}

impl Conflict {
    pub fn involves(&self, id: Uuid) -> bool {
        self.job_id == id || self.conflicting_job_ids.contains(&id)
    }
}

// ============================================================================
// Materialization
// ============================================================================

/// Configuration for materialization behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MaterializationConfig {
    /// Rolling window, in months past today, up to which instances are created
    pub horizon_months: u32,
    /// Maximum instances written for one series per run
    pub max_batch_size: usize,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self {
            horizon_months: 3,
            max_batch_size: 100,
        }
    }
}

/// Outcome of materializing a single series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SeriesResult {
    Success {
        #[serde(rename = "seriesId")]
        series_id: Uuid,
        #[serde(rename = "instancesCreated")]
        instances_created: usize,
    },
    Error {
        #[serde(rename = "seriesId")]
        series_id: Uuid,
        error: String,
    },
}

impl SeriesResult {
    pub fn series_id(&self) -> Uuid {
        match self {
            SeriesResult::Success { series_id, .. } | SeriesResult::Error { series_id, .. } => {
                *series_id
            }
        }
    }

    pub fn instances_created(&self) -> usize {
        match self {
            SeriesResult::Success {
                instances_created, ..
            } => *instances_created,
            SeriesResult::Error { .. } => 0,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SeriesResult::Error { .. })
    }
}

/// Result of one materializer run, shaped for the scheduled trigger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MaterializationReport {
    pub processed_count: usize,
    pub results: Vec<SeriesResult>,
}

impl MaterializationReport {
    pub fn instances_created(&self) -> usize {
        self.results.iter().map(SeriesResult::instances_created).sum()
    }

    pub fn errors(&self) -> impl Iterator<Item = &SeriesResult> {
        self.results.iter().filter(|r| r.is_error())
    }
}

/// Summary returned when a whole series is cancelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesCancellation {
    pub series_id: Uuid,
    pub cancelled: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_transitions() {
        assert!(JobStatus::Scheduled.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Completed));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Scheduled.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::Completed.can_transition_to(JobStatus::Cancelled));
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::Scheduled));
        assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Scheduled));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("in_progress".parse::<JobStatus>(), Ok(JobStatus::InProgress));
        assert_eq!("Canceled".parse::<JobStatus>(), Ok(JobStatus::Cancelled));
        assert!("paused".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_duration_defaults_to_an_hour() {
        let job = Job {
            scheduled_time: NaiveTime::from_hms_opt(10, 0, 0),
            ..Default::default()
        };
        assert_eq!(job.duration_minutes(), 60);
        assert_eq!(
            job.ends_at().unwrap().time(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_end_condition_uses_end_type() {
        let job = Job {
            recurring_end_type: Some(RecurringEndType::Occurrences),
            recurring_occurrences: Some(4),
            recurring_end_date: Some(date(2024, 6, 1)),
            ..Default::default()
        };
        assert_eq!(
            job.end_condition().unwrap(),
            Some(EndCondition::Occurrences { limit: 4 })
        );
    }

    #[test]
    fn test_end_condition_without_type_and_both_fields_is_rejected() {
        let job = Job {
            recurring_occurrences: Some(4),
            recurring_end_date: Some(date(2024, 6, 1)),
            ..Default::default()
        };
        assert!(matches!(job.end_condition(), Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_end_condition_missing_count() {
        let job = Job {
            recurring_end_type: Some(RecurringEndType::Occurrences),
            ..Default::default()
        };
        assert!(job.end_condition().is_err());

        let job = Job {
            recurring_occurrences: Some(0),
            ..Default::default()
        };
        assert!(job.end_condition().is_err());
    }

    #[test]
    fn test_report_json_shape() {
        let id = Uuid::now_v7();
        let report = MaterializationReport {
            processed_count: 2,
            results: vec![
                SeriesResult::Success {
                    series_id: id,
                    instances_created: 3,
                },
                SeriesResult::Error {
                    series_id: id,
                    error: "boom".to_string(),
                },
            ],
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["processedCount"], 2);
        assert_eq!(value["results"][0]["status"], "success");
        assert_eq!(value["results"][0]["instancesCreated"], 3);
        assert_eq!(value["results"][1]["status"], "error");
        assert_eq!(value["results"][1]["error"], "boom");
        assert!(value["results"][1].get("instancesCreated").is_none());
        assert_eq!(report.instances_created(), 3);
    }

    #[test]
    fn test_end_condition_json() {
        let end = EndCondition::Date {
            end_date: date(2024, 12, 31),
        };
        let value = serde_json::to_value(end).unwrap();
        assert_eq!(value["kind"], "date");
        assert_eq!(value["endDate"], "2024-12-31");
        assert!(end.has_passed(date(2025, 1, 1)));
        assert!(!end.has_passed(date(2024, 12, 31)));
    }
}
