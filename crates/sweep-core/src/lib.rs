//! # Sweep Core Library
//!
//! Scheduling core for a cleaning business: recurring job series, rolling
//! instance materialization, same-day conflict detection and series lifecycle.
//!
//! ## Features
//!
//! - **Recurring Series**: weekly, biweekly, monthly and quarterly series with
//!   an optional end date or occurrence limit
//! - **Rolling Materialization**: concrete instances are created a fixed number
//!   of months ahead; runs are idempotent and safe to repeat
//! - **Conflict Detection**: overlapping time windows on the same day are
//!   reported as non-blocking warnings
//! - **Lifecycle Management**: cancel single instances or whole series, expire
//!   finished series, and move instances through their status states
//!
//! ## Core Modules
//!
//! - [`db`]: Database connection and migration management
//! - [`models`]: Core data structures and transfer objects
//! - [`repository`]: The [`JobStore`](repository::JobStore) storage port and its SQLite adapter
//! - [`recurrence`]: Pure recurrence date evaluation
//! - [`materialization`]: Rolling-horizon instance generation
//! - [`conflicts`]: Time-overlap detection
//! - [`lifecycle`]: Cancellation, expiry and status transitions
//! - [`calendar`]: Day and range views with conflict checks
//! - [`timezone`]: Business-local "today"
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use sweep_core::{
//!     db,
//!     error::CoreError,
//!     materialization::InstanceMaterializer,
//!     models::{EndCondition, NewJobData, NewRecurrence, RecurringFrequency},
//!     repository::{JobStore, SqliteJobStore},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CoreError> {
//!     let pool = db::establish_connection("jobs.db").await?;
//!     let store = Arc::new(SqliteJobStore::new(pool));
//!
//!     let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     store
//!         .create_job(NewJobData {
//!             title: "Office clean".to_string(),
//!             scheduled_date: Some(start),
//!             recurrence: Some(NewRecurrence {
//!                 frequency: RecurringFrequency::Weekly,
//!                 end: Some(EndCondition::Occurrences { limit: 3 }),
//!             }),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let report = InstanceMaterializer::with_defaults(store).run(start).await?;
//!     println!("Created {} instances", report.instances_created());
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod conflicts;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod materialization;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod timezone;
