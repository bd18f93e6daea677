use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use rpc_gateway::router::{Mux, PatternMux, RouteTarget, RoutePattern};

fn build_mux(route_count: usize) -> PatternMux {
    let mux = PatternMux::new();
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        for i in 0..route_count {
            let pattern = RoutePattern::parse(&format!("/service-{}/items/{{id}}", i)).unwrap();
            let target = RouteTarget {
                service_name: format!("service-{}", i),
                method_name: "GetItem".to_string(),
                service_versions: vec!["v1".to_string()],
            };
            mux.handle("GET", pattern, target).await.unwrap();
        }
    });
    mux
}

fn bench_dispatch_dynamic(c: &mut Criterion) {
    let mut group = c.benchmark_group("mux_dispatch_dynamic");
    let rt = tokio::runtime::Runtime::new().unwrap();

    for route_count in [1, 10, 100, 500].iter() {
        let mux = Arc::new(build_mux(*route_count));
        let path = format!("/service-{}/items/42", route_count - 1);

        group.bench_with_input(
            BenchmarkId::new("dispatch", route_count),
            route_count,
            |b, _| {
                b.iter(|| {
                    rt.block_on(async {
                        let result = mux.dispatch("GET", black_box(&path)).await;
                        black_box(result)
                    })
                })
            },
        );
    }

    group.finish();
}

fn bench_dispatch_static(c: &mut Criterion) {
    let mut group = c.benchmark_group("mux_dispatch_static");
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mux = PatternMux::new();
    rt.block_on(async {
        let pattern = RoutePattern::parse("/healthz").unwrap();
        let target = RouteTarget {
            service_name: "probe".to_string(),
            method_name: "Check".to_string(),
            service_versions: vec!["v1".to_string()],
        };
        mux.handle("GET", pattern, target).await.unwrap();
    });

    group.bench_function("dispatch_static", |b| {
        b.iter(|| {
            rt.block_on(async {
                let result = mux.dispatch("GET", black_box("/healthz")).await;
                black_box(result)
            })
        })
    });

    group.finish();
}

fn bench_pattern_parse(c: &mut Criterion) {
    c.bench_function("pattern_parse_dynamic", |b| {
        b.iter(|| black_box(RoutePattern::parse(black_box("/users/{id}/orders/{order_id}"))))
    });
}

criterion_group!(
    benches,
    bench_dispatch_dynamic,
    bench_dispatch_static,
    bench_pattern_parse
);
criterion_main!(benches);
