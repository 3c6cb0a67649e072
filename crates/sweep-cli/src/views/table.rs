use chrono::NaiveDate;
use chrono_humanize::HumanTime;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use owo_colors::OwoColorize;
use sweep_core::calendar::DaySchedule;
use sweep_core::conflicts::conflicts_for;
use sweep_core::models::{Conflict, Job, JobStatus};
use uuid::Uuid;

pub fn short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

fn relative_date(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_string(),
        _ => HumanTime::from(date - today).to_string(),
    }
}

fn job_row(job: &Job, conflicts: &[Conflict], today: NaiveDate) -> Row {
    let mut row = Row::new();
    row.add_cell(Cell::new(short_id(&job.id)));

    let mut date_cell = Cell::new(format!(
        "{} ({})",
        job.scheduled_date,
        relative_date(job.scheduled_date, today)
    ));
    if job.scheduled_date < today && !job.status.is_terminal() {
        date_cell = date_cell.fg(Color::Red);
    } else if job.scheduled_date == today {
        date_cell = date_cell.fg(Color::Yellow);
    }
    row.add_cell(date_cell);

    row.add_cell(Cell::new(match (job.starts_at(), job.ends_at()) {
        (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
        _ => "Any time".to_string(),
    }));

    let mut title = String::new();
    if job.is_series_root() || job.is_instance() {
        title.push_str("↻ ");
    }
    title.push_str(&job.title);
    if !conflicts_for(job.id, conflicts).is_empty() {
        title.push_str(" ⚠");
    }
    let title_cell = match job.status {
        JobStatus::Completed | JobStatus::Cancelled => Cell::new(title)
            .add_attribute(Attribute::CrossedOut)
            .fg(Color::DarkGrey),
        JobStatus::InProgress => Cell::new(title).add_attribute(Attribute::Bold),
        JobStatus::Scheduled => Cell::new(title),
    };
    row.add_cell(title_cell);

    row.add_cell(Cell::new(job.client_name.as_deref().unwrap_or("None")));

    let status_cell = Cell::new(job.status.to_string());
    row.add_cell(match job.status {
        JobStatus::Completed => status_cell.fg(Color::Green),
        JobStatus::Cancelled => status_cell.fg(Color::DarkGrey),
        JobStatus::InProgress => status_cell.fg(Color::Cyan),
        JobStatus::Scheduled => status_cell,
    });

    row
}

pub fn display_jobs(jobs: &[Job], conflicts: &[Conflict], today: NaiveDate) {
    if jobs.is_empty() {
        println!("No jobs found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Time", "Title", "Client", "Status"]);
    for job in jobs {
        table.add_row(job_row(job, conflicts, today));
    }

    println!("{table}");
}

/// Prints one line per conflict, naming both jobs.
pub fn display_conflicts(conflicts: &[Conflict], jobs: &[Job]) {
    if conflicts.is_empty() {
        println!("No conflicts found.");
        return;
    }

    let title_of = |id: &Uuid| {
        jobs.iter()
            .find(|j| j.id == *id)
            .map_or_else(|| short_id(id), |j| j.title.clone())
    };

    for conflict in conflicts {
        println!(
            "{} '{}' ({}): {}",
            "⚠".yellow().bold(),
            title_of(&conflict.job_id),
            short_id(&conflict.job_id).yellow(),
            conflict.description
        );
    }
}

pub fn display_schedule(days: &[DaySchedule], today: NaiveDate) {
    let jobs: Vec<Job> = days.iter().flat_map(|d| d.jobs.iter().cloned()).collect();
    let conflicts: Vec<Conflict> = days.iter().flat_map(|d| d.conflicts.iter().cloned()).collect();
    display_jobs(&jobs, &conflicts, today);

    let conflicted = days.iter().filter(|d| d.has_conflicts()).count();
    if conflicted > 0 {
        println!(
            "{} {} day(s) with overlapping jobs; run `sweep day <DATE>` for details.",
            "⚠".yellow().bold(),
            conflicted
        );
    }
}
