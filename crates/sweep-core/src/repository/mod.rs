use crate::db::DbPool;
use crate::error::CoreError;
use crate::models::{Job, NewJobData, UpdateJobData};
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

pub mod jobs;

/// Storage port for jobs.
///
/// Every scheduling component receives an implementation of this trait at
/// construction time; nothing in the core reaches a database on its own.
/// Implementations must enforce uniqueness of `(parent_job_id, occurrence_date)`
/// for instances.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Validates and persists a standalone job or series root.
    async fn create_job(&self, data: NewJobData) -> Result<Job, CoreError>;
    async fn find_job_by_id(&self, id: Uuid) -> Result<Option<Job>, CoreError>;
    async fn find_jobs_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Job>, CoreError>;
    /// Roots with `is_recurring = true`.
    async fn find_active_series_roots(&self) -> Result<Vec<Job>, CoreError>;
    /// Latest grid date materialized for the series, ignoring any rescheduling.
    async fn find_latest_instance_date(&self, parent_id: Uuid) -> Result<Option<NaiveDate>, CoreError>;
    async fn count_instances(&self, parent_id: Uuid) -> Result<usize, CoreError>;
    async fn find_instances(&self, parent_id: Uuid) -> Result<Vec<Job>, CoreError>;
    /// Jobs scheduled in `[start, end]`, ordered by date then time.
    async fn find_jobs_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Job>, CoreError>;
    /// Inserts materialized instances. Duplicates of an existing
    /// `(parent_job_id, occurrence_date)` are ignored; returns the rows written.
    async fn insert_instances(&self, instances: Vec<Job>) -> Result<usize, CoreError>;
    async fn update_job(&self, id: Uuid, data: UpdateJobData) -> Result<Job, CoreError>;
}

/// SQLite implementation of the job store
pub struct SqliteJobStore {
    pool: DbPool,
}

impl SqliteJobStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool for internal use across modules
    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }
}
