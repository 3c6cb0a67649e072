//! Time-window conflict detection over a day's jobs.
//!
//! A job occupies `[start, start + duration)`, where the duration falls back to
//! [`DEFAULT_DURATION_MINUTES`](crate::models::DEFAULT_DURATION_MINUTES). Two jobs
//! conflict when they share a date and their windows strictly overlap. Jobs with
//! no time of day and cancelled jobs never conflict.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::models::{Conflict, ConflictType, Job, JobStatus};

struct Window<'a> {
    job: &'a Job,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Window<'_> {
    fn overlaps(&self, other: &Window<'_>) -> bool {
        self.job.scheduled_date == other.job.scheduled_date
            && self.start < other.end
            && other.start < self.end
    }
}

fn window(job: &Job) -> Option<Window<'_>> {
    if job.status == JobStatus::Cancelled {
        return None;
    }
    Some(Window {
        job,
        start: job.starts_at()?,
        end: job.ends_at()?,
    })
}

/// Returns one conflict record per overlapping unordered pair.
///
/// The record is keyed on whichever job of the pair comes first in `jobs`; its
/// description names the other job and that job's start time.
pub fn detect_conflicts(jobs: &[Job]) -> Vec<Conflict> {
    let windows: Vec<Window<'_>> = jobs.iter().filter_map(window).collect();
    let mut conflicts = Vec::new();

    for (i, first) in windows.iter().enumerate() {
        for second in &windows[i + 1..] {
            if first.overlaps(second) {
                conflicts.push(Conflict {
                    job_id: first.job.id,
                    conflicting_job_ids: vec![second.job.id],
                    conflict_type: ConflictType::Time,
                    description: format!(
                        "Overlaps with '{}' at {}",
                        second.job.title,
                        second.start.format("%H:%M")
                    ),
                });
            }
        }
    }

    conflicts
}

/// Conflicts that involve `job_id` on either side.
pub fn conflicts_for(job_id: Uuid, conflicts: &[Conflict]) -> Vec<&Conflict> {
    conflicts.iter().filter(|c| c.involves(job_id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use proptest::prelude::*;
    use rstest::rstest;

    fn job(title: &str, day: u32, time: Option<(u32, u32)>, duration: Option<i64>) -> Job {
        Job {
            id: Uuid::new_v4(),
            title: title.to_string(),
            scheduled_date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            scheduled_time: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            estimated_duration: duration,
            ..Default::default()
        }
    }

    #[test]
    fn test_overlap_example_day() {
        let a = job("A", 4, Some((10, 0)), Some(60));
        let b = job("B", 4, Some((10, 30)), Some(30));
        let c = job("C", 4, Some((12, 0)), Some(30));

        let conflicts = detect_conflicts(&[a.clone(), b.clone(), c.clone()]);

        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.job_id, a.id);
        assert_eq!(conflict.conflicting_job_ids, vec![b.id]);
        assert_eq!(conflict.conflict_type, ConflictType::Time);
        assert_eq!(conflict.description, "Overlaps with 'B' at 10:30");
        assert!(conflicts_for(c.id, &conflicts).is_empty());
    }

    #[rstest]
    #[case::back_to_back((9, 0), Some(60), (10, 0), false)]
    #[case::one_minute_overlap((9, 0), Some(61), (10, 0), true)]
    #[case::same_start((9, 0), Some(15), (9, 0), true)]
    #[case::default_duration((9, 0), None, (9, 59), true)]
    #[case::default_duration_boundary((9, 0), None, (10, 0), false)]
    #[case::zero_duration_uses_default((9, 0), Some(0), (9, 30), true)]
    fn test_overlap_boundaries(
        #[case] first: (u32, u32),
        #[case] first_duration: Option<i64>,
        #[case] second: (u32, u32),
        #[case] expected: bool,
    ) {
        let jobs = [
            job("first", 4, Some(first), first_duration),
            job("second", 4, Some(second), Some(30)),
        ];
        assert_eq!(!detect_conflicts(&jobs).is_empty(), expected);
    }

    #[test]
    fn test_untimed_jobs_are_ignored() {
        let jobs = [
            job("timed", 4, Some((10, 0)), Some(120)),
            job("untimed", 4, None, Some(600)),
        ];
        assert!(detect_conflicts(&jobs).is_empty());
    }

    #[test]
    fn test_different_dates_never_conflict() {
        let jobs = [
            job("monday", 4, Some((10, 0)), Some(60)),
            job("tuesday", 5, Some((10, 0)), Some(60)),
        ];
        assert!(detect_conflicts(&jobs).is_empty());
    }

    #[test]
    fn test_late_job_does_not_wrap_past_midnight() {
        let jobs = [
            job("late", 4, Some((23, 30)), Some(120)),
            job("early next day", 5, Some((0, 30)), Some(30)),
            job("early same day", 4, Some((0, 30)), Some(30)),
        ];
        assert!(detect_conflicts(&jobs).is_empty());
    }

    #[test]
    fn test_unrepresentable_duration_runs_to_end_of_day() {
        let stored = job("marathon", 4, Some((9, 0)), Some(i64::MAX));
        let later = job("evening", 4, Some((22, 0)), Some(30));
        let next_day = job("next day", 5, Some((0, 0)), Some(30));

        assert_eq!(
            stored.ends_at(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
        );
        let conflicts = detect_conflicts(&[stored.clone(), later.clone(), next_day]);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].job_id, stored.id);
        assert_eq!(conflicts[0].conflicting_job_ids, vec![later.id]);
    }

    #[test]
    fn test_cancelled_jobs_are_ignored() {
        let mut cancelled = job("cancelled", 4, Some((10, 0)), Some(60));
        cancelled.status = JobStatus::Cancelled;
        let jobs = [cancelled, job("active", 4, Some((10, 0)), Some(60))];
        assert!(detect_conflicts(&jobs).is_empty());
    }

    #[test]
    fn test_three_way_overlap_yields_three_pairs() {
        let a = job("A", 4, Some((9, 0)), Some(180));
        let b = job("B", 4, Some((10, 0)), Some(60));
        let c = job("C", 4, Some((10, 30)), Some(60));
        let conflicts = detect_conflicts(&[a.clone(), b.clone(), c.clone()]);

        assert_eq!(conflicts.len(), 3);
        assert_eq!(conflicts_for(a.id, &conflicts).len(), 2);
        assert_eq!(conflicts_for(b.id, &conflicts).len(), 2);
        assert_eq!(conflicts_for(c.id, &conflicts).len(), 2);
    }

    fn job_strategy() -> impl Strategy<Value = Job> {
        (
            prop::option::of((6u32..20, 0u32..4)),
            prop::option::of(0i64..240),
            1u32..3,
        )
            .prop_map(|(time, duration, day)| {
                job("generated", day, time.map(|(h, q)| (h, q * 15)), duration)
            })
    }

    proptest! {
        #[test]
        fn test_one_record_per_unordered_pair(jobs in prop::collection::vec(job_strategy(), 0..12)) {
            let conflicts = detect_conflicts(&jobs);

            let mut pairs: Vec<(Uuid, Uuid)> = conflicts
                .iter()
                .map(|c| {
                    let (a, b) = (c.job_id, c.conflicting_job_ids[0]);
                    if a < b { (a, b) } else { (b, a) }
                })
                .collect();
            let total = pairs.len();
            pairs.sort();
            pairs.dedup();
            prop_assert_eq!(pairs.len(), total);

            for conflict in &conflicts {
                prop_assert_eq!(conflict.conflicting_job_ids.len(), 1);
                prop_assert_ne!(conflict.job_id, conflict.conflicting_job_ids[0]);
            }
        }

        #[test]
        fn test_untimed_jobs_never_appear(jobs in prop::collection::vec(job_strategy(), 0..12)) {
            let conflicts = detect_conflicts(&jobs);
            for untimed in jobs.iter().filter(|j| j.scheduled_time.is_none()) {
                prop_assert!(conflicts_for(untimed.id, &conflicts).is_empty());
            }
        }

        #[test]
        fn test_matches_brute_force_overlap_count(jobs in prop::collection::vec(job_strategy(), 0..12)) {
            let mut expected = 0;
            for (i, a) in jobs.iter().enumerate() {
                for b in &jobs[i + 1..] {
                    if let (Some(sa), Some(ea), Some(sb), Some(eb)) =
                        (a.starts_at(), a.ends_at(), b.starts_at(), b.ends_at())
                    {
                        if sa < eb && sb < ea {
                            expected += 1;
                        }
                    }
                }
            }
            prop_assert_eq!(detect_conflicts(&jobs).len(), expected);
        }
    }
}
