use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meteofuse::{merge_tables, Observation, ObservationTable, Parameter};

/// One year of hourly observations for a single station, with `offset`
/// shifting the values so the merge inputs disagree.
fn year_of_hours(station: &str, offset: f64) -> ObservationTable {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut table = ObservationTable::new();
    for hour in 0..(366 * 24) {
        let time = start + Duration::hours(hour);
        table.push(
            Observation::new(station, time)
                .with(Parameter::Temp, 10.0 + offset)
                .with(Parameter::Wspd, 12.0)
                .with(Parameter::Pres, 1013.0 + offset),
        );
    }
    table
}

fn bench_merge(c: &mut Criterion) {
    let high = year_of_hours("10637", 0.0);
    let low = year_of_hours("10637", 5.0);

    c.bench_function("merge_two_overlapping_years", |b| {
        b.iter(|| merge_tables(black_box(vec![high.clone(), low.clone()])))
    });

    let merged = merge_tables(vec![high.clone(), low.clone()]);
    c.bench_function("squash_merged_year", |b| {
        b.iter(|| black_box(&merged).squash())
    });
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
