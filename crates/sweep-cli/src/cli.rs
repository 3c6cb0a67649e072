use clap::{Parser, Subcommand, ValueEnum};
use sweep_core::models::RecurringFrequency;

/// Scheduling CLI for recurring cleaning jobs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a one-off job or a recurring series
    Add(AddCommand),
    /// List jobs over a date range
    List(ListCommand),
    /// Show one day's jobs with overlap warnings
    Day(DayCommand),
    /// List time conflicts on a date
    Conflicts(ConflictsCommand),
    /// Generate upcoming instances for every active series
    Materialize(MaterializeCommand),
    /// Cancel one or more jobs
    Cancel(CancelCommand),
    /// Cancel a recurring series and its open instances
    CancelSeries(CancelSeriesCommand),
    /// Stop series whose end date has passed
    Expire(ExpireCommand),
    /// Mark a job as in progress
    Start(StatusCommand),
    /// Mark a job as completed
    Done(StatusCommand),
    /// Move a job to another date or time
    Reschedule(RescheduleCommand),
    /// Preview upcoming dates of a series
    Preview(PreviewCommand),
}

/// Recurrence frequency accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
}

impl From<Frequency> for RecurringFrequency {
    fn from(frequency: Frequency) -> Self {
        match frequency {
            Frequency::Weekly => RecurringFrequency::Weekly,
            Frequency::Biweekly => RecurringFrequency::Biweekly,
            Frequency::Monthly => RecurringFrequency::Monthly,
            Frequency::Quarterly => RecurringFrequency::Quarterly,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The title of the job
    pub title: String,
    /// The date of the job (first date for a series), defaults to today
    #[clap(short, long)]
    pub date: Option<String>,
    /// Start time (e.g., '9:00 AM', '14:30')
    #[clap(long)]
    pub at: Option<String>,
    /// Estimated duration in minutes
    #[clap(long)]
    pub duration: Option<i64>,
    #[clap(short, long)]
    pub client: Option<String>,
    #[clap(long)]
    pub service: Option<String>,
    #[clap(long)]
    pub address: Option<String>,
    #[clap(long)]
    pub price: Option<f64>,
    #[clap(short, long)]
    pub notes: Option<String>,
    /// Make the job a recurring series
    #[clap(long, value_enum)]
    pub every: Option<Frequency>,
    /// Last date a series may run on
    #[clap(long, requires = "every", conflicts_with = "count")]
    pub until: Option<String>,
    /// Total number of occurrences in the series
    #[clap(long, requires = "every")]
    pub count: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// First date of the range, defaults to today
    #[clap(long)]
    pub from: Option<String>,
    /// Last date of the range, defaults to a week after the first
    #[clap(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DayCommand {
    /// The date to show, defaults to today
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ConflictsCommand {
    /// The date to check, defaults to today
    pub date: Option<String>,
    /// Print conflict records as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct MaterializeCommand {
    /// Treat this date as today instead of the configured timezone's date
    #[clap(long)]
    pub today: Option<String>,
    /// Keep running, materializing every SECS seconds until interrupted
    #[clap(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub every: Option<u64>,
}

#[derive(Parser, Debug, Clone)]
pub struct CancelCommand {
    /// IDs (or ID prefixes) of the jobs to cancel
    #[clap(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CancelSeriesCommand {
    /// The ID of the series root
    pub id: String,
    /// Skip the confirmation prompt
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ExpireCommand {
    /// Treat this date as today
    #[clap(long)]
    pub today: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    /// The ID of the job
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RescheduleCommand {
    /// The ID of the job to move
    pub id: String,
    /// The new date
    pub date: String,
    /// The new start time
    #[clap(long)]
    pub at: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// The ID of the series root
    pub id: String,
    /// Number of dates to show
    #[clap(short = 'n', long, default_value_t = 5)]
    pub count: usize,
    /// Show dates on or after this date, defaults to today
    #[clap(long)]
    pub from: Option<String>,
}
