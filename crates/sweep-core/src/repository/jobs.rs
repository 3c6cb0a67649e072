use crate::error::CoreError;
use crate::models::{
    EndCondition, Job, JobStatus, NewJobData, UpdateJobData, MAX_DURATION_MINUTES,
};
use crate::repository::SqliteJobStore;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};
use tracing::debug;
use uuid::Uuid;

const INSERT_JOB: &str = r#"INSERT INTO jobs (id, title, client_name, service_type, address, price, notes, scheduled_date, scheduled_time, estimated_duration, status, is_recurring, recurring_frequency, recurring_end_type, recurring_end_date, recurring_occurrences, parent_job_id, occurrence_date, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)"#;

// Only a second instance for the same grid date is skipped; any other
// constraint violation still fails the batch.
const INSERT_INSTANCE_SUFFIX: &str = " ON CONFLICT (parent_job_id, occurrence_date) DO NOTHING";

/// Rejects malformed jobs before anything is written.
fn validate_new_job(data: &NewJobData) -> Result<NaiveDate, CoreError> {
    if data.title.trim().is_empty() {
        return Err(CoreError::InvalidInput("A job needs a title.".to_string()));
    }

    let scheduled_date = data.scheduled_date.ok_or_else(|| {
        CoreError::InvalidInput("A job needs a scheduled date.".to_string())
    })?;

    if let Some(minutes) = data.estimated_duration {
        if minutes <= 0 {
            return Err(CoreError::InvalidInput(format!(
                "Estimated duration must be positive, got {} minutes.",
                minutes
            )));
        }
        if minutes > MAX_DURATION_MINUTES {
            return Err(CoreError::InvalidInput(format!(
                "Estimated duration cannot exceed {} minutes, got {}.",
                MAX_DURATION_MINUTES, minutes
            )));
        }
    }

    if let Some(recurrence) = &data.recurrence {
        match recurrence.end {
            Some(EndCondition::Occurrences { limit: 0 }) => {
                return Err(CoreError::InvalidInput(
                    "A recurring series needs at least one occurrence.".to_string(),
                ));
            }
            Some(EndCondition::Date { end_date }) if end_date < scheduled_date => {
                return Err(CoreError::InvalidInput(format!(
                    "Series end date {} is before its first date {}.",
                    end_date, scheduled_date
                )));
            }
            _ => {}
        }
    }

    Ok(scheduled_date)
}

async fn insert_job<'e, E>(executor: E, sql: &str, job: &Job) -> Result<u64, CoreError>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(sql)
        .bind(job.id)
        .bind(&job.title)
        .bind(&job.client_name)
        .bind(&job.service_type)
        .bind(&job.address)
        .bind(job.price)
        .bind(&job.notes)
        .bind(job.scheduled_date)
        .bind(job.scheduled_time)
        .bind(job.estimated_duration)
        .bind(job.status)
        .bind(job.is_recurring)
        .bind(job.recurring_frequency)
        .bind(job.recurring_end_type)
        .bind(job.recurring_end_date)
        .bind(job.recurring_occurrences)
        .bind(job.parent_job_id)
        .bind(job.occurrence_date)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

#[async_trait]
impl super::JobStore for SqliteJobStore {
    async fn create_job(&self, data: NewJobData) -> Result<Job, CoreError> {
        let scheduled_date = validate_new_job(&data)?;
        let now = Utc::now();

        let (frequency, end) = match data.recurrence {
            Some(recurrence) => (Some(recurrence.frequency), recurrence.end),
            None => (None, None),
        };

        let job = Job {
            id: Uuid::new_v4(),
            title: data.title,
            client_name: data.client_name,
            service_type: data.service_type,
            address: data.address,
            price: data.price,
            notes: data.notes,
            scheduled_date,
            scheduled_time: data.scheduled_time,
            estimated_duration: data.estimated_duration,
            status: JobStatus::Scheduled,
            is_recurring: frequency.is_some(),
            recurring_frequency: frequency,
            recurring_end_type: end.map(|e| e.end_type()),
            recurring_end_date: match end {
                Some(EndCondition::Date { end_date }) => Some(end_date),
                _ => None,
            },
            recurring_occurrences: match end {
                Some(EndCondition::Occurrences { limit }) => Some(i64::from(limit)),
                _ => None,
            },
            parent_job_id: None,
            occurrence_date: None,
            created_at: now,
            updated_at: now,
        };

        insert_job(self.pool(), INSERT_JOB, &job).await?;
        debug!(job_id = %job.id, recurring = job.is_recurring, "job created");
        Ok(job)
    }

    async fn find_job_by_id(&self, id: Uuid) -> Result<Option<Job>, CoreError> {
        let job = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(job)
    }

    async fn find_jobs_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Job>, CoreError> {
        let prefix = short_id.replace('-', "").to_lowercase();
        // The prefix is matched with LIKE, so wildcards must never reach the query.
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidInput(format!(
                "Short ID '{}' must be hex digits",
                short_id
            )));
        }
        let jobs = sqlx::query_as("SELECT * FROM jobs WHERE lower(hex(id)) LIKE $1")
            .bind(format!("{}%", prefix))
            .fetch_all(self.pool())
            .await?;
        Ok(jobs)
    }

    async fn find_active_series_roots(&self) -> Result<Vec<Job>, CoreError> {
        let roots = sqlx::query_as(
            r#"SELECT * FROM jobs
            WHERE is_recurring = 1 AND parent_job_id IS NULL
            ORDER BY scheduled_date, id"#,
        )
        .fetch_all(self.pool())
        .await?;
        Ok(roots)
    }

    async fn find_latest_instance_date(&self, parent_id: Uuid) -> Result<Option<NaiveDate>, CoreError> {
        let latest = sqlx::query_scalar(
            r#"SELECT occurrence_date FROM jobs
            WHERE parent_job_id = $1 AND occurrence_date IS NOT NULL
            ORDER BY occurrence_date DESC
            LIMIT 1"#,
        )
        .bind(parent_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(latest)
    }

    async fn count_instances(&self, parent_id: Uuid) -> Result<usize, CoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE parent_job_id = $1")
            .bind(parent_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count as usize)
    }

    async fn find_instances(&self, parent_id: Uuid) -> Result<Vec<Job>, CoreError> {
        let instances = sqlx::query_as(
            "SELECT * FROM jobs WHERE parent_job_id = $1 ORDER BY scheduled_date",
        )
        .bind(parent_id)
        .fetch_all(self.pool())
        .await?;
        Ok(instances)
    }

    async fn find_jobs_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Job>, CoreError> {
        let jobs = sqlx::query_as(
            r#"SELECT * FROM jobs
            WHERE scheduled_date BETWEEN $1 AND $2
            ORDER BY scheduled_date, scheduled_time IS NULL, scheduled_time, created_at"#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(self.pool())
        .await?;
        Ok(jobs)
    }

    async fn insert_instances(&self, instances: Vec<Job>) -> Result<usize, CoreError> {
        if instances.is_empty() {
            return Ok(0);
        }

        let sql = format!("{}{}", INSERT_JOB, INSERT_INSTANCE_SUFFIX);
        let mut tx = self.pool().begin().await?;
        let mut written = 0u64;
        for instance in &instances {
            written += insert_job(&mut *tx, &sql, instance).await?;
        }
        tx.commit().await?;

        if (written as usize) < instances.len() {
            debug!(
                requested = instances.len(),
                written,
                "duplicate instances ignored"
            );
        }
        Ok(written as usize)
    }

    async fn update_job(&self, id: Uuid, data: UpdateJobData) -> Result<Job, CoreError> {
        let expected_status = data.expected_status;
        let target_status = data.status;
        let mut tx = self.pool().begin().await?;

        if !data.is_empty() {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE jobs SET updated_at = ");
            qb.push_bind(Utc::now());

            if let Some(title) = data.title {
                qb.push(", title = ");
                qb.push_bind(title);
            }
            if let Some(notes) = data.notes {
                qb.push(", notes = ");
                qb.push_bind(notes);
            }
            if let Some(price) = data.price {
                qb.push(", price = ");
                qb.push_bind(price);
            }
            if let Some(scheduled_date) = data.scheduled_date {
                qb.push(", scheduled_date = ");
                qb.push_bind(scheduled_date);
            }
            if let Some(scheduled_time) = data.scheduled_time {
                qb.push(", scheduled_time = ");
                qb.push_bind(scheduled_time);
            }
            if let Some(estimated_duration) = data.estimated_duration {
                qb.push(", estimated_duration = ");
                qb.push_bind(estimated_duration);
            }
            if let Some(status) = data.status {
                qb.push(", status = ");
                qb.push_bind(status);
            }
            if let Some(is_recurring) = data.is_recurring {
                qb.push(", is_recurring = ");
                qb.push_bind(is_recurring);
            }

            qb.push(" WHERE id = ");
            qb.push_bind(id);
            if let Some(expected) = expected_status {
                qb.push(" AND status = ");
                qb.push_bind(expected);
            }

            let result = qb.build().execute(&mut *tx).await?;
            if result.rows_affected() == 0 {
                let current: Option<JobStatus> =
                    sqlx::query_scalar("SELECT status FROM jobs WHERE id = $1")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?;
                return Err(match current {
                    Some(from) => CoreError::InvalidTransition {
                        id,
                        from,
                        to: target_status.unwrap_or(from),
                    },
                    None => CoreError::NotFound(id.to_string()),
                });
            }
        }

        let updated: Job = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        tx.commit().await?;
        Ok(updated)
    }
}
