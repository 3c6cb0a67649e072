use anyhow::{anyhow, Result};
use chrono::Days;
use sweep_core::calendar::{day_schedule, range_schedule};
use sweep_core::repository::JobStore;

use crate::cli::{ConflictsCommand, DayCommand, ListCommand};
use crate::config::Config;
use crate::parser::parse_date;
use crate::views::table::{display_conflicts, display_jobs, display_schedule};

const DEFAULT_RANGE_DAYS: u64 = 7;

pub async fn list_jobs(store: &impl JobStore, command: ListCommand, config: &Config) -> Result<()> {
    let today = config.today()?;
    let from = match &command.from {
        Some(d) => parse_date(d, today)?,
        None => today,
    };
    let to = match &command.to {
        Some(d) => parse_date(d, today)?,
        None => from
            .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
            .ok_or_else(|| anyhow!("Date range is out of bounds"))?,
    };

    let days = range_schedule(store, from, to).await?;
    display_schedule(&days, today);
    Ok(())
}

pub async fn show_day(store: &impl JobStore, command: DayCommand, config: &Config) -> Result<()> {
    let today = config.today()?;
    let date = match &command.date {
        Some(d) => parse_date(d, today)?,
        None => today,
    };

    let day = day_schedule(store, date).await?;
    display_jobs(&day.jobs, &day.conflicts, today);
    if day.has_conflicts() {
        println!();
        display_conflicts(&day.conflicts, &day.jobs);
    }
    Ok(())
}

pub async fn list_conflicts(
    store: &impl JobStore,
    command: ConflictsCommand,
    config: &Config,
) -> Result<()> {
    let today = config.today()?;
    let date = match &command.date {
        Some(d) => parse_date(d, today)?,
        None => today,
    };

    let day = day_schedule(store, date).await?;
    if command.json {
        println!("{}", serde_json::to_string_pretty(&day.conflicts)?);
    } else {
        display_conflicts(&day.conflicts, &day.jobs);
    }
    Ok(())
}
