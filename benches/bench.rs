// Criterion benchmarks for Blacklist Check

use blacklist_check::core::{select_fuzzy_match, CacheKey};
use blacklist_check::models::{CandidateRecord, CheckRequest};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn create_candidate(id: usize) -> CandidateRecord {
    CandidateRecord {
        name: format!("John Doe {}", id),
        birth_place: if id % 2 == 0 { "Jakarta" } else { "Bandung" }.to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1 + (id % 28) as u32).unwrap(),
        reason: format!("reason {}", id),
        similarity_score: Some(1.0 - id as f64 * 0.1),
    }
}

fn create_request() -> CheckRequest {
    CheckRequest::new("John Doe")
        .unwrap()
        .with_birth_place("Surabaya")
        .with_birth_date(NaiveDate::from_ymd_opt(1990, 1, 5).unwrap())
}

fn bench_cache_key(c: &mut Criterion) {
    let fuzzy = create_request();
    let exact = create_request().with_identity_number("1234567890123456");

    c.bench_function("cache_key_fuzzy", |b| {
        b.iter(|| CacheKey::for_request(black_box(&fuzzy)));
    });
    c.bench_function("cache_key_nik", |b| {
        b.iter(|| CacheKey::for_request(black_box(&exact)));
    });
}

fn bench_select_fuzzy_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_fuzzy_match");
    let request = create_request();

    for size in [1, 5, 50].iter() {
        let candidates: Vec<CandidateRecord> = (0..*size).map(create_candidate).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| select_fuzzy_match(black_box(&request), black_box(&candidates)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_cache_key, bench_select_fuzzy_match);
criterion_main!(benches);
