use anyhow::{anyhow, Result};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parses a calendar date, accepting ISO dates and phrases like "tomorrow"
/// or "next friday" relative to `today`.
pub fn parse_date(date_str: &str, today: NaiveDate) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
        return Ok(date);
    }

    let now = Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN));
    parse_date_string(date_str, now, Dialect::Us)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", date_str, e))
}

const TIME_FORMATS: [&str; 4] = ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"];

/// Parses a time of day such as "14:30" or "9:00 AM".
pub fn parse_time(time_str: &str) -> Result<NaiveTime> {
    let input = time_str.trim().to_uppercase();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(&input, format).ok())
        .ok_or_else(|| anyhow!("Failed to parse time '{}'", time_str))
}
