use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use survey_display::DisplayTreeBuilder;
use survey_submission::extract_repeat_answers;
use survey_test_utils::{wide_repeat_asset, wide_repeat_submission};

const QUESTIONS: usize = 40;

fn bench_build(c: &mut Criterion) {
    let asset = wide_repeat_asset(QUESTIONS);
    let builder = DisplayTreeBuilder::for_asset(&asset);

    let mut group = c.benchmark_group("build_tree");
    for &instances in &[1usize, 10, 100] {
        let submission = wide_repeat_submission(QUESTIONS, instances);
        group.throughput(Throughput::Elements(instances as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(instances),
            &submission,
            |b, submission| b.iter(|| black_box(builder.build(submission))),
        );
    }
    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_repeat_answers");
    for &instances in &[10usize, 100, 1000] {
        let submission = wide_repeat_submission(QUESTIONS, instances);
        group.throughput(Throughput::Elements(instances as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(instances),
            &submission,
            |b, submission| b.iter(|| black_box(extract_repeat_answers(submission, "wide/q7"))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_extract);
criterion_main!(benches);
