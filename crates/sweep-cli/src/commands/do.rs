use anyhow::Result;
use owo_colors::OwoColorize;
use std::sync::Arc;
use sweep_core::lifecycle::SeriesManager;
use sweep_core::repository::JobStore;

use crate::cli::{RescheduleCommand, StatusCommand};
use crate::config::Config;
use crate::parser::{parse_date, parse_time};
use crate::util::resolve_job_id;

pub async fn start_job<S: JobStore>(store: Arc<S>, command: StatusCommand) -> Result<()> {
    let id = resolve_job_id(store.as_ref(), &command.id).await?;
    let job = SeriesManager::new(store).start_job(id).await?;
    println!("Started job: '{}'", job.title);
    Ok(())
}

pub async fn complete_job<S: JobStore>(store: Arc<S>, command: StatusCommand) -> Result<()> {
    let id = resolve_job_id(store.as_ref(), &command.id).await?;
    let job = SeriesManager::new(store).complete_job(id).await?;
    println!("{} Completed job: '{}'", "✓".green().bold(), job.title);
    Ok(())
}

pub async fn reschedule_job<S: JobStore>(
    store: Arc<S>,
    command: RescheduleCommand,
    config: &Config,
) -> Result<()> {
    let id = resolve_job_id(store.as_ref(), &command.id).await?;
    let date = parse_date(&command.date, config.today()?)?;
    let time = command.at.as_deref().map(parse_time).transpose()?;

    let job = SeriesManager::new(store)
        .reschedule_instance(id, date, time)
        .await?;

    let when = match job.scheduled_time {
        Some(t) => format!("{} at {}", job.scheduled_date, t.format("%H:%M")),
        None => job.scheduled_date.to_string(),
    };
    println!("Moved '{}' to {}", job.title, when.cyan());
    Ok(())
}
