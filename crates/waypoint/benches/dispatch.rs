//! Resolution and dispatch benchmarks.
//!
//! Run with: `cargo bench -p waypoint`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use waypoint::Engine;
use waypoint_core::fixtures;
use waypoint_core::{Api, Endpoint};

fn wide_api(endpoints: usize) -> Api {
    (0..endpoints).fold(Api::new("catalog").with_version("v1"), |api, i| {
        api.with_endpoint(
            Endpoint::new(format!("collection{i}"))
                .with_path(&format!("collection{i}/{{id:[0-9]{{1,8}}}}/*"))
                .with_action(fixtures::mock("list")),
        )
    })
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    for endpoints in [4, 32, 256] {
        let engine = Engine::new(vec![wide_api(endpoints)]);
        let url = format!("/catalog/v1/collection{}/42/items", endpoints - 1);

        group.bench_with_input(BenchmarkId::from_parameter(endpoints), &url, |b, url| {
            b.iter(|| black_box(engine.resolve(&Method::GET, black_box(url)).is_ok()));
        });
    }

    group.finish();
}

fn bench_service(c: &mut Criterion) {
    let engine = Engine::builder()
        .api(fixtures::northwind_api())
        .debug(false)
        .build();

    c.bench_function("service_northwind", |b| {
        b.iter(|| black_box(engine.get(black_box("/northwind/dynamo/orders/10248")).status()));
    });
}

fn bench_service_not_found(c: &mut Criterion) {
    let engine = Engine::new(fixtures::versioned_apis());

    c.bench_function("service_no_api", |b| {
        b.iter(|| black_box(engine.get(black_box("/missing/v1/ep1")).status()));
    });
}

criterion_group!(benches, bench_resolve, bench_service, bench_service_not_found);
criterion_main!(benches);
