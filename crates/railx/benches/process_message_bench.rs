//! 🏎️ How fast can one incident go from XML to rows? Criterion knows.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use railx::backends::SAMPLE_INCIDENT_XML;
use railx::transforms::{ParserConfig, parse_incident};
use railx::{IncidentPipeline, process_message};

fn bench_process_message(c: &mut Criterion) {
    c.bench_function("process_message/le_sx_sample", |b| {
        b.iter(|| process_message(black_box(SAMPLE_INCIDENT_XML)))
    });

    let legacy = IncidentPipeline::new(ParserConfig {
        legacy_duplicate_mode: true,
        ..ParserConfig::default()
    });
    c.bench_function("process_message/le_sx_sample_legacy", |b| {
        b.iter(|| legacy.process_message(black_box(SAMPLE_INCIDENT_XML)))
    });

    let parser_config = ParserConfig::default();
    c.bench_function("parse_incident/le_sx_sample", |b| {
        b.iter(|| parse_incident(black_box(SAMPLE_INCIDENT_XML), &parser_config))
    });
}

criterion_group!(benches, bench_process_message);
criterion_main!(benches);
