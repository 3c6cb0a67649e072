use anyhow::Result;
use chrono::NaiveDate;
use owo_colors::OwoColorize;
use std::sync::Arc;
use std::time::Duration;
use sweep_core::lifecycle::SeriesManager;
use sweep_core::materialization::InstanceMaterializer;
use sweep_core::repository::JobStore;
use tracing::{info, warn};

use crate::cli::{ExpireCommand, MaterializeCommand};
use crate::config::Config;
use crate::parser::parse_date;

fn resolve_today(override_date: Option<&str>, config: &Config) -> Result<NaiveDate> {
    let today = config.today()?;
    match override_date {
        Some(d) => parse_date(d, today),
        None => Ok(today),
    }
}

async fn run_once<S: JobStore>(
    materializer: &InstanceMaterializer<S>,
    override_date: Option<&str>,
    config: &Config,
) -> Result<()> {
    let today = resolve_today(override_date, config)?;
    let report = materializer.run(today).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Runs the materializer once, or on a fixed interval until Ctrl-C.
pub async fn materialize<S: JobStore>(
    store: Arc<S>,
    command: MaterializeCommand,
    config: &Config,
) -> Result<()> {
    let materializer = InstanceMaterializer::new(store, config.materialization.clone());
    let override_date = command.today.as_deref();

    let Some(seconds) = command.every else {
        return run_once(&materializer, override_date, config).await;
    };

    info!(interval_secs = seconds, "starting periodic materialization");
    let mut interval = tokio::time::interval(Duration::from_secs(seconds));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // A failed run is retried on the next tick.
                if let Err(e) = run_once(&materializer, override_date, config).await {
                    warn!(error = %e, "materialization run failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping periodic materialization");
                break;
            }
        }
    }

    Ok(())
}

pub async fn expire<S: JobStore>(store: Arc<S>, command: ExpireCommand, config: &Config) -> Result<()> {
    let today = resolve_today(command.today.as_deref(), config)?;
    let expired = SeriesManager::new(store).expire_series(today).await?;

    if expired.is_empty() {
        println!("No series to expire.");
    } else {
        println!("{} Expired {} series:", "✓".green().bold(), expired.len());
        for id in expired {
            println!("  {}", id.to_string().yellow());
        }
    }
    Ok(())
}
