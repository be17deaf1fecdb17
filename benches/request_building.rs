//! Benchmarks for request building and envelope decoding
//!
//! This benchmark measures:
//! - Descriptor construction with query, form and JSON bodies
//! - URL assembly with percent-encoding
//! - Envelope extraction from list responses

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cognitive_sdk::request::RequestBuilder;
use cognitive_sdk::response;
use cognitive_sdk::speech::RecognizeOptions;

fn bench_descriptor(c: &mut Criterion) {
    let options = RecognizeOptions::new()
        .continuous(true)
        .max_alternatives(3)
        .timestamps(true)
        .word_confidence(true)
        .model("en-US_BroadbandModel");

    c.bench_function("build_recognize_descriptor", |b| {
        b.iter(|| {
            let mut builder = RequestBuilder::post("/v1/sessions/abc/recognize")
                .header("cookie", "SESSIONID=engine-4");
            for (k, v) in black_box(&options).query_pairs() {
                builder = builder.query(k, v);
            }
            let request = builder.build().unwrap();
            black_box(request.url("https://stream.example.com/speech-to-text/api").unwrap())
        })
    });

    c.bench_function("build_converse_form", |b| {
        b.iter(|| {
            RequestBuilder::post("/v1/dialogs/d-1/conversation")
                .form_opt("conversation_id", Some(99))
                .form_opt("client_id", Some(5))
                .form_opt("input", Some(black_box("I want a large pizza")))
                .build()
                .unwrap()
        })
    });
}

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope_field");
    for n in [10usize, 100, 1000] {
        let items: Vec<serde_json::Value> = (0..n)
            .map(|i| serde_json::json!({"dialog_id": format!("d-{}", i), "name": "bench"}))
            .collect();
        let body = serde_json::json!({ "dialogs": items }).to_string();
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &body, |b, body| {
            b.iter(|| {
                let value = response::parse_json(black_box(body)).unwrap();
                let mut object = match value {
                    serde_json::Value::Object(map) => map,
                    _ => unreachable!(),
                };
                let list: Vec<serde_json::Value> =
                    response::envelope_field(&mut object, "dialogs").unwrap();
                black_box(list.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_descriptor, bench_envelope);
criterion_main!(benches);
