use chrono::{Days, Months, NaiveDate};

use crate::error::CoreError;
use crate::models::{EndCondition, Job, RecurringFrequency};

/// Distance between two consecutive occurrences of a frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Days(u64),
    Months(u32),
}

impl RecurringFrequency {
    pub fn step(self) -> Step {
        match self {
            RecurringFrequency::Weekly => Step::Days(7),
            RecurringFrequency::Biweekly => Step::Days(14),
            RecurringFrequency::Monthly => Step::Months(1),
            RecurringFrequency::Quarterly => Step::Months(3),
        }
    }
}

/// RecurrenceRule: the date grid of a recurring series.
///
/// Occurrence `n` is always computed from the series start as
/// `series_start + n * step`, never from the previous occurrence. Month based
/// steps therefore clamp to the last day of short months (Jan 31 -> Feb 29)
/// and return to the original day afterwards (-> Mar 31).
///
/// Every method is a pure function of the rule and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: RecurringFrequency,
    pub series_start: NaiveDate,
    pub end: Option<EndCondition>,
}

impl RecurrenceRule {
    pub fn new(
        frequency: RecurringFrequency,
        series_start: NaiveDate,
        end: Option<EndCondition>,
    ) -> Self {
        Self {
            frequency,
            series_start,
            end,
        }
    }

    /// Builds the rule stored on a series root.
    ///
    /// # Behavior
    /// - Instances and jobs without a frequency are rejected
    /// - The end condition columns are validated through [`Job::end_condition`]
    pub fn from_job(job: &Job) -> Result<Self, CoreError> {
        if job.is_instance() {
            return Err(CoreError::InvalidInput(format!(
                "Job {} is an instance of series {}, not a series root",
                job.id,
                job.parent_job_id.unwrap_or_default()
            )));
        }
        let frequency = job.recurring_frequency.ok_or_else(|| {
            CoreError::InvalidInput(format!("Job {} has no recurring frequency", job.id))
        })?;
        let end = job.end_condition()?;
        Ok(Self::new(frequency, job.scheduled_date, end))
    }

    /// The n-th grid date, counting the series start as occurrence 0.
    pub fn nth(&self, n: u32) -> Option<NaiveDate> {
        match self.frequency.step() {
            Step::Days(days) => self
                .series_start
                .checked_add_days(Days::new(days.checked_mul(u64::from(n))?)),
            Step::Months(months) => self
                .series_start
                .checked_add_months(Months::new(months.checked_mul(n)?)),
        }
    }

    /// Unbounded grid starting at the series start. Ends only on date overflow.
    pub fn grid(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0u32..).map_while(move |n| self.nth(n))
    }

    /// First grid date strictly after `date`, ignoring end conditions.
    pub fn next_after(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.grid().find(|d| *d > date)
    }

    /// Dates due for materialization.
    ///
    /// # Arguments
    /// * `anchor` - Earliest date that may be produced
    /// * `horizon_end` - Latest date that may be produced
    /// * `already_materialized` - Instances persisted for this series so far
    ///
    /// # Behavior
    /// - Produces grid dates in `[anchor, horizon_end]`, ascending, no duplicates
    /// - A date end condition caps the range; if it lies before the anchor the
    ///   result is empty
    /// - An occurrence limit caps the output at `limit - already_materialized`
    ///   so repeated invocations never exceed the limit in total
    pub fn dates(
        &self,
        anchor: NaiveDate,
        horizon_end: NaiveDate,
        already_materialized: usize,
    ) -> Vec<NaiveDate> {
        let mut upper = horizon_end;
        let mut remaining = usize::MAX;

        match self.end {
            Some(EndCondition::Date { end_date }) => upper = upper.min(end_date),
            Some(EndCondition::Occurrences { limit }) => {
                remaining = (limit as usize).saturating_sub(already_materialized)
            }
            None => {}
        }

        if anchor > upper || remaining == 0 {
            return Vec::new();
        }

        self.grid()
            .skip_while(|d| *d < anchor)
            .take_while(|d| *d <= upper)
            .take(remaining)
            .collect()
    }

    /// Preview the nominal occurrences of the rule on or after `from`.
    ///
    /// Occurrence limits count from the series start here, independent of what
    /// has been materialized.
    pub fn preview(&self, from: NaiveDate, count: usize) -> Vec<NaiveDate> {
        let limit = match self.end {
            Some(EndCondition::Occurrences { limit }) => limit as usize,
            _ => usize::MAX,
        };
        let end_date = match self.end {
            Some(EndCondition::Date { end_date }) => Some(end_date),
            _ => None,
        };

        self.grid()
            .take(limit)
            .take_while(|d| end_date.map_or(true, |end| *d <= end))
            .filter(|d| *d >= from)
            .take(count)
            .collect()
    }

    /// True once a date end condition lies before `today`.
    pub fn is_finished(&self, today: NaiveDate) -> bool {
        self.end.map_or(false, |end| end.has_passed(today))
    }
}
