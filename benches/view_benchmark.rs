use airq_dashboard::analyzers::ViewResolver;
use airq_dashboard::models::{Dataset, Record, TemperatureCategory, Variable};
use airq_dashboard::processors::IntegrityChecker;
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Hourly readings for two stations with a daily and a seasonal cycle
fn create_test_dataset(days: usize) -> Dataset {
    let start = NaiveDate::from_ymd_opt(2013, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut records = Vec::with_capacity(days * 24 * 2);

    for (station, offset) in [("Dongsi", 10.0), ("Wanliu", 0.0)] {
        for h in 0..days * 24 {
            let timestamp = start + Duration::hours(h as i64);
            let day_phase = (h % 24) as f64 / 24.0 * std::f64::consts::TAU;
            let year_phase = (h / 24) as f64 / 365.0 * std::f64::consts::TAU;

            let temp = 12.0 - 15.0 * year_phase.cos() + 4.0 * day_phase.sin();
            let pm10 = 100.0 + offset + 30.0 * day_phase.cos() - temp;
            // Sprinkle missing values the way the monitoring network does
            let pm10 = if h % 37 == 0 { None } else { Some(pm10.max(0.0)) };

            records.push(Record::new(
                timestamp,
                station,
                pm10,
                Some(temp),
                Some(temp - 10.0),
                Some(1015.0 - temp * 0.5),
            ));
        }
    }

    Dataset::new(records)
}

fn benchmark_hourly_mean(c: &mut Criterion) {
    let dataset = create_test_dataset(365);
    let resolver = ViewResolver::new();

    c.bench_function("hourly_mean", |b| {
        b.iter(|| black_box(resolver.hourly_mean(&dataset, "Dongsi").map(|s| s.points.len())))
    });
}

fn benchmark_hourly_mean_by_category(c: &mut Criterion) {
    let dataset = create_test_dataset(365);
    let resolver = ViewResolver::new();

    c.bench_function("hourly_mean_by_category", |b| {
        b.iter(|| {
            black_box(
                resolver
                    .hourly_mean_by_category(&dataset, "Wanliu", TemperatureCategory::Cold)
                    .map(|s| s.total_count()),
            )
        })
    });
}

fn benchmark_integrity_checker(c: &mut Criterion) {
    let dataset = create_test_dataset(90);

    c.bench_function("integrity_checker", |b| {
        b.iter(|| {
            let checker = IntegrityChecker::new();
            black_box(checker.check_integrity(&dataset).total_records)
        })
    });
}

fn benchmark_correlation_by_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation_matrix_by_days");

    for &days in &[30, 180, 730] {
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            let dataset = create_test_dataset(days);
            let resolver = ViewResolver::new();
            b.iter(|| black_box(resolver.correlation_matrix(&dataset, &Variable::ALL).is_ok()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_hourly_mean,
    benchmark_hourly_mean_by_category,
    benchmark_integrity_checker,
    benchmark_correlation_by_size
);
criterion_main!(benches);
