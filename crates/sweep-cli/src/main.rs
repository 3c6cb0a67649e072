use clap::Parser;
use owo_colors::{OwoColorize, Style};
use std::sync::Arc;
use sweep_core::db;
use sweep_core::error::CoreError;
use sweep_core::repository::SqliteJobStore;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::Config::new() {
        Ok(config) => config,
        Err(e) => {
            handle_error(e);
            std::process::exit(1);
        }
    };

    // Logs go to stderr so JSON reports on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let store = Arc::new(SqliteJobStore::new(db_pool));

    let result = match cli.command {
        cli::Commands::Add(command) => commands::add::add_job(store.as_ref(), command, &config).await,
        cli::Commands::List(command) => {
            commands::list::list_jobs(store.as_ref(), command, &config).await
        }
        cli::Commands::Day(command) => commands::list::show_day(store.as_ref(), command, &config).await,
        cli::Commands::Conflicts(command) => {
            commands::list::list_conflicts(store.as_ref(), command, &config).await
        }
        cli::Commands::Materialize(command) => {
            commands::materialize::materialize(store, command, &config).await
        }
        cli::Commands::Cancel(command) => commands::cancel::cancel_jobs(store, command).await,
        cli::Commands::CancelSeries(command) => {
            commands::cancel::cancel_series(store, command).await
        }
        cli::Commands::Expire(command) => commands::materialize::expire(store, command, &config).await,
        cli::Commands::Start(command) => commands::r#do::start_job(store, command).await,
        cli::Commands::Done(command) => commands::r#do::complete_job(store, command).await,
        cli::Commands::Reschedule(command) => {
            commands::r#do::reschedule_job(store, command, &config).await
        }
        cli::Commands::Preview(command) => {
            commands::recurrence::preview_series(store.as_ref(), command, &config).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(_) => {
                eprintln!("{} {}", "Error:".style(error_style), core_error);
            }
            CoreError::AmbiguousId(jobs) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, title) in jobs {
                    eprintln!("  {} ({})", id.yellow(), title);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidTransition { from, to, .. } => {
                eprintln!(
                    "{} A {} job cannot be marked {}",
                    "Error:".style(error_style),
                    from.yellow(),
                    to.yellow()
                );
            }
            CoreError::PartialCancellation { cancelled, failed } => {
                eprintln!(
                    "{} Cancelled {} job(s), but {} could not be cancelled:",
                    "Error:".style(error_style),
                    cancelled,
                    failed.len()
                );
                for (id, reason) in failed {
                    eprintln!("  {} {}", id.to_string().yellow(), reason);
                }
            }
            CoreError::InvalidTimezone(tz) => {
                eprintln!(
                    "{} Invalid timezone: '{}'. Use IANA timezone names like 'America/New_York'",
                    "Error:".style(error_style),
                    tz
                );
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
