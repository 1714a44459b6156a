//! Performance benchmarks for the network speed tester
//!
//! Covers the work done around each timed request: payload generation,
//! latency aggregation, rate derivation and report serialization. None of
//! these should be visible next to network time.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use net_speed_tester::{
    output::{report_json, OutputFormatterFactory},
    payload,
    server::handlers::parse_size_kb,
    stats::{self, LatencySampler, TransferRate},
    FullTestReport, LatencyResult,
};

/// Create a report resembling a complete run
fn create_sample_report() -> FullTestReport {
    let mut report = FullTestReport::new("http://localhost:3001");
    report.tests.latency = Some(LatencyResult {
        average: 12,
        min: 9,
        max: 18,
        n_samples: 5,
    });
    report.tests.download = Some(stats::transfer_result(1000, 480));
    report.tests.upload = Some(stats::transfer_result(1000, 730));
    report
}

/// Benchmark random payload generation at common transfer sizes
fn benchmark_payload_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("payload_generation");
    group.sample_size(20);

    for size_kb in [1u64, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("random_base64", size_kb), size_kb, |b, &size_kb| {
            b.iter(|| payload::random_base64(black_box(size_kb)))
        });
    }

    group.finish();
}

/// Benchmark latency sample aggregation
fn benchmark_latency_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("latency_statistics");

    for count in [5u32, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("sampler_finish", count), count, |b, &count| {
            b.iter(|| {
                let mut sampler = LatencySampler::new(count);
                for i in 0..count {
                    if i % 10 == 9 {
                        sampler.record_failure("timeout");
                    } else {
                        sampler.record_success(10 + u64::from(i % 40));
                    }
                }
                sampler.finish()
            })
        });
    }

    group.finish();
}

/// Benchmark throughput derivation
fn benchmark_transfer_rates(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer_rates");

    group.bench_function("compute", |b| {
        b.iter(|| TransferRate::compute(black_box(1_024_000), black_box(500)))
    });

    group.bench_function("transfer_result", |b| {
        b.iter(|| stats::transfer_result(black_box(10_240), black_box(1_337)))
    });

    group.bench_function("parse_size_kb", |b| {
        b.iter(|| {
            parse_size_kb(black_box("1000"));
            parse_size_kb(black_box("12abc"));
            parse_size_kb(black_box("-5"));
        })
    });

    group.finish();
}

/// Benchmark report rendering
fn benchmark_report_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_output");
    let report = create_sample_report();

    group.bench_function("json_pretty", |b| b.iter(|| report_json(black_box(&report), true)));
    group.bench_function("json_compact", |b| b.iter(|| report_json(black_box(&report), false)));

    let formatter = OutputFormatterFactory::create_formatter(false, true);
    group.bench_function("plain_summary", |b| {
        b.iter(|| formatter.format_report(black_box(&report)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_payload_generation,
    benchmark_latency_statistics,
    benchmark_transfer_rates,
    benchmark_report_output
);
criterion_main!(benches);
