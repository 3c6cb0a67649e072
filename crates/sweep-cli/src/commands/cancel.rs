use anyhow::{anyhow, Result};
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use std::sync::Arc;
use sweep_core::lifecycle::SeriesManager;
use sweep_core::repository::JobStore;

use crate::cli::{CancelCommand, CancelSeriesCommand};
use crate::util::{resolve_job, resolve_job_id};

pub async fn cancel_jobs<S: JobStore>(store: Arc<S>, command: CancelCommand) -> Result<()> {
    let mut ids = Vec::with_capacity(command.ids.len());
    for short_id in &command.ids {
        ids.push(resolve_job_id(store.as_ref(), short_id).await?);
    }

    let cancelled = SeriesManager::new(store).cancel_instances(&ids).await?;
    println!("{} Cancelled {} job(s)", "✓".green().bold(), cancelled);
    Ok(())
}

pub async fn cancel_series<S: JobStore>(store: Arc<S>, command: CancelSeriesCommand) -> Result<()> {
    let root = resolve_job(store.as_ref(), &command.id).await?;
    if !root.is_series_root() {
        return Err(anyhow!(
            "'{}' is not a recurring series; use `sweep cancel` for single jobs",
            root.title
        ));
    }

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Cancel every open visit of '{}' and stop the series?",
                root.title
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Series cancellation aborted.");
            return Ok(());
        }
    }

    let result = SeriesManager::new(store).cancel_series(root.id).await?;
    println!(
        "{} Stopped series '{}' and cancelled {} open visit(s)",
        "✓".green().bold(),
        root.title.bright_white().bold(),
        result.cancelled
    );
    Ok(())
}
