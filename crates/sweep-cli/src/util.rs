use anyhow::{anyhow, Result};
use sweep_core::error::CoreError;
use sweep_core::models::Job;
use sweep_core::repository::JobStore;
use uuid::Uuid;

pub async fn resolve_job_id(store: &impl JobStore, short_id: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(short_id) {
        return Ok(id);
    }
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    if !short_id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' is not a job ID; IDs only contain hex digits.",
            short_id
        ))));
    }
    let jobs = store.find_jobs_by_short_id_prefix(short_id).await?;
    if jobs.len() == 1 {
        Ok(jobs[0].id)
    } else if jobs.is_empty() {
        Err(anyhow!(CoreError::NotFound(short_id.to_string())))
    } else {
        let job_info: Vec<(String, String)> = jobs
            .into_iter()
            .map(|j| (j.id.to_string(), j.title))
            .collect();
        Err(anyhow!(CoreError::AmbiguousId(job_info)))
    }
}

pub async fn resolve_job(store: &impl JobStore, short_id: &str) -> Result<Job> {
    let id = resolve_job_id(store, short_id).await?;
    store
        .find_job_by_id(id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))
}
