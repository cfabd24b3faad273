use std::collections::HashSet;

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use matchcore::core::compat;
use matchcore::core::filters::{FilterContext, FilterPipeline};
use matchcore::core::strategy::StrategyConfig;
use matchcore::core::{calculate_bounding_box, haversine_distance};
use matchcore::models::domain::{DrinkingStatus, EducationLevel, SmokingStatus};
use matchcore::models::{CandidateRequest, Profile};

fn profile(user_id: i64, lat: f64, lon: f64) -> Profile {
    Profile {
        id: user_id,
        user_id,
        gender: "female".to_string(),
        age: 28,
        latitude: lat,
        longitude: lon,
        city: None,
        country: None,
        preferred_gender: "male".to_string(),
        min_age: 18,
        max_age: 99,
        max_distance_km: 50.0,
        looking_for: None,
        wants_children: Some(true),
        has_children: Some(false),
        smoking_status: SmokingStatus::Never,
        drinking_status: DrinkingStatus::Sometimes,
        religion: Some("none".to_string()),
        education_level: Some(EducationLevel::Bachelor),
        interests: vec!["hiking".to_string(), "reading".to_string(), "travel".to_string()],
        location_weight: 0.3,
        age_weight: 0.2,
        interests_weight: 0.2,
        education_weight: 0.15,
        lifestyle_weight: 0.15,
        is_active: true,
        is_verified: true,
        desirability_score: 50.0,
        last_active_at: Utc::now(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| haversine_distance(black_box(59.33), black_box(18.07), black_box(55.60), black_box(13.00)))
    });
}

fn bench_bounding_box(c: &mut Criterion) {
    c.bench_function("calculate_bounding_box", |b| {
        b.iter(|| calculate_bounding_box(black_box(59.33), black_box(18.07), black_box(50.0)))
    });
}

fn bench_compatibility_compute(c: &mut Criterion) {
    let requester = profile(1, 59.33, 18.07);
    let target = profile(2, 59.35, 18.10);
    let config = StrategyConfig::default();

    c.bench_function("compat_compute", |b| {
        b.iter(|| {
            compat::compute(
                black_box(&requester),
                black_box(&target),
                Utc::now(),
                config.lifestyle_penalties,
                config.activity_half_life_days,
            )
        })
    });
}

fn bench_filter_pipeline_build(c: &mut Criterion) {
    let requester = profile(1, 59.33, 18.07);
    let options = CandidateRequest::default();
    let pipeline = FilterPipeline::default_pipeline();

    let mut group = c.benchmark_group("filter_pipeline_build");
    for exclusions in [0usize, 100, 1000] {
        let swiped: HashSet<i64> = (0..exclusions as i64).collect();
        let blocked: HashSet<i64> = HashSet::new();
        group.bench_with_input(BenchmarkId::from_parameter(exclusions), &exclusions, |b, _| {
            let ctx = FilterContext {
                requester: &requester,
                swiped_ids: &swiped,
                blocked_ids: &blocked,
                options: &options,
            };
            b.iter(|| pipeline.build(black_box(&ctx), black_box(20)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_bounding_box,
    bench_compatibility_compute,
    bench_filter_pipeline_build
);
criterion_main!(benches);
