use chrono::{NaiveDate, NaiveTime};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sweep_core::conflicts::detect_conflicts;
use sweep_core::models::{EndCondition, Job, RecurringFrequency};
use sweep_core::recurrence::RecurrenceRule;
use uuid::Uuid;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()
}

fn bench_rule_dates(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_dates");
    let anchor = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let horizon_end = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();

    for frequency in [
        RecurringFrequency::Weekly,
        RecurringFrequency::Biweekly,
        RecurringFrequency::Monthly,
        RecurringFrequency::Quarterly,
    ] {
        let rule = RecurrenceRule::new(frequency, start(), None);
        group.bench_with_input(BenchmarkId::from_parameter(frequency), &rule, |b, rule| {
            b.iter(|| rule.dates(black_box(anchor), black_box(horizon_end), 0))
        });
    }

    group.finish();
}

fn bench_occurrence_limit(c: &mut Criterion) {
    let rule = RecurrenceRule::new(
        RecurringFrequency::Weekly,
        start(),
        Some(EndCondition::Occurrences { limit: 500 }),
    );
    let horizon_end = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();

    c.bench_function("weekly_limit_500", |b| {
        b.iter(|| rule.dates(black_box(start()), black_box(horizon_end), black_box(120)))
    });
}

fn day_of_jobs(count: usize) -> Vec<Job> {
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    (0..count)
        .map(|i| Job {
            id: Uuid::now_v7(),
            title: format!("Job {}", i),
            scheduled_date: day,
            scheduled_time: NaiveTime::from_hms_opt(6 + (i as u32 % 12), (i as u32 * 15) % 60, 0),
            estimated_duration: Some(30 + (i as i64 % 4) * 30),
            ..Default::default()
        })
        .collect()
}

fn bench_conflict_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_conflicts");

    for count in [10, 40, 100] {
        let jobs = day_of_jobs(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &jobs, |b, jobs| {
            b.iter(|| detect_conflicts(black_box(jobs)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_rule_dates,
    bench_occurrence_limit,
    bench_conflict_detection
);
criterion_main!(benches);
