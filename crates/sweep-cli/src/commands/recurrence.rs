use anyhow::{anyhow, Result};
use owo_colors::OwoColorize;
use sweep_core::models::EndCondition;
use sweep_core::recurrence::RecurrenceRule;
use sweep_core::repository::JobStore;

use crate::cli::PreviewCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::util::resolve_job;

pub async fn preview_series(store: &impl JobStore, command: PreviewCommand, config: &Config) -> Result<()> {
    let root = resolve_job(store, &command.id).await?;
    if !root.is_series_root() {
        return Err(anyhow!("'{}' is not a recurring series", root.title));
    }

    let today = config.today()?;
    let from = match &command.from {
        Some(d) => parse_date(d, today)?,
        None => today,
    };
    let rule = RecurrenceRule::from_job(&root)?;
    let dates = rule.preview(from, command.count);

    println!("{}", "Series Preview".blue().bold());
    println!("Series: {} ({})", root.title.cyan(), root.id.to_string().yellow());
    println!("Repeats: {} from {}", rule.frequency.green(), rule.series_start);
    match rule.end {
        Some(EndCondition::Date { end_date }) => println!("Ends: on {}", end_date),
        Some(EndCondition::Occurrences { limit }) => println!("Ends: after {} visits", limit),
        None => println!("Ends: never"),
    }
    println!(
        "Active: {}",
        if root.is_recurring {
            "Yes".green().to_string()
        } else {
            "No".red().to_string()
        }
    );

    if dates.is_empty() {
        println!("\nNo upcoming dates.");
        return Ok(());
    }

    println!("\nNext {} date(s):", dates.len());
    for (i, date) in dates.iter().enumerate() {
        println!("  {}. {} {}", i + 1, date, date.format("(%A)").to_string().bright_black());
    }
    Ok(())
}
