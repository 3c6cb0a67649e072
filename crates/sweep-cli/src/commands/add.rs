use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use sweep_core::models::{EndCondition, NewJobData, NewRecurrence};
use sweep_core::repository::JobStore;

use crate::cli::AddCommand;
use crate::config::Config;
use crate::parser::{parse_date, parse_time};

pub async fn add_job(store: &impl JobStore, command: AddCommand, config: &Config) -> Result<()> {
    let today = config.today()?;
    let scheduled_date = match &command.date {
        Some(d) => parse_date(d, today)?,
        None => today,
    };
    let scheduled_time = command.at.as_deref().map(parse_time).transpose()?;

    let recurrence = match command.every {
        Some(frequency) => {
            let end = match (&command.until, command.count) {
                (Some(until), _) => Some(EndCondition::Date {
                    end_date: parse_date(until, today)?,
                }),
                (None, Some(limit)) => Some(EndCondition::Occurrences { limit }),
                (None, None) => None,
            };
            Some(NewRecurrence {
                frequency: frequency.into(),
                end,
            })
        }
        None => None,
    };

    let job = store
        .create_job(NewJobData {
            title: command.title,
            client_name: command.client,
            service_type: command.service,
            address: command.address,
            price: command.price,
            notes: command.notes,
            scheduled_date: Some(scheduled_date),
            scheduled_time,
            estimated_duration: command.duration,
            recurrence,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    if let Some(frequency) = job.recurring_frequency {
        println!(
            "{} Created recurring series: {}",
            "✓".style(success_style),
            job.title.bright_white().bold()
        );
        println!("  {} Job ID: {}", "→".style(info_style), job.id.to_string().yellow());
        println!(
            "  {} Repeats {} from {}",
            "→".style(info_style),
            frequency,
            job.scheduled_date.to_string().cyan()
        );
        println!(
            "  {} Run `sweep materialize` to create upcoming visits",
            "→".style(info_style)
        );
    } else {
        println!(
            "{} Created job: {}",
            "✓".style(success_style),
            job.title.bright_white().bold()
        );
        println!("  {} Job ID: {}", "→".style(info_style), job.id.to_string().yellow());
        println!(
            "  {} Scheduled: {}",
            "→".style(info_style),
            job.scheduled_date.to_string().cyan()
        );
    }

    Ok(())
}
