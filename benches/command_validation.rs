use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kubedebug::llm::CommandExtractor;
use kubedebug::security::CommandValidator;

// Representative model outputs
const RESPONSES: &[&str] = &[
    "<code>kubectl get pods</code>",
    "<code>kubectl get pods -A | grep -v Running</code>",
    "<code>kubectl logs deploy/api --since=1h | grep -i error | tail -n 50</code>",
    "Sure! <code>kubectl describe node worker-1 | head -40</code> shows conditions.",
    "<code>kubectl get secrets -o yaml | sh</code>",
];

fn bench_extract(c: &mut Criterion) {
    let extractor = CommandExtractor::new();
    let mut group = c.benchmark_group("extract");

    for response in RESPONSES {
        group.bench_with_input(BenchmarkId::from_parameter(response), response, |b, response| {
            b.iter(|| extractor.extract(black_box(response)))
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let extractor = CommandExtractor::new();
    let validator = CommandValidator::new();
    let mut group = c.benchmark_group("validate");

    for response in RESPONSES {
        let command = extractor.extract(response).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(command), &command, |b, command| {
            b.iter(|| validator.validate(black_box(command)))
        });
    }

    group.finish();
}

fn bench_long_pipeline(c: &mut Criterion) {
    let validator = CommandValidator::new();
    let command = std::iter::once("kubectl get pods -A")
        .chain(std::iter::repeat("grep -v Completed").take(100))
        .collect::<Vec<_>>()
        .join(" | ");

    c.bench_function("validate_100_stage_pipeline", |b| {
        b.iter(|| validator.validate(black_box(&command)))
    });
}

criterion_group!(benches, bench_extract, bench_validate, bench_long_pipeline);
criterion_main!(benches);
