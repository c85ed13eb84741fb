use criterion::{black_box, criterion_group, criterion_main, Criterion};
use starlark::environment::Module;
use starjs::{Bridge, Gateway, HostValue};

/// A record-shaped object, like the rows a host typically passes in.
fn make_record(i: usize) -> HostValue {
    HostValue::object([
        ("id", HostValue::Number(i as f64)),
        ("name", HostValue::String(format!("item-{i}"))),
        ("price", HostValue::Number(i as f64 + 0.25)),
        ("tags", HostValue::Array(vec![HostValue::String("a".into()), HostValue::String("b".into())])),
        ("active", HostValue::Bool(i % 2 == 0)),
    ])
}

fn make_rows(n: usize) -> HostValue {
    HostValue::Array((0..n).map(make_record).collect())
}

fn bench_bridge(c: &mut Criterion) {
    let bridge = Bridge::default();
    let small = make_rows(10);
    let large = make_rows(1000);

    let mut g = c.benchmark_group("bridge_roundtrip");

    g.bench_function("rows_10", |b| {
        b.iter(|| {
            let module = Module::new();
            let v = bridge.to_starlark(black_box(&small), module.heap());
            bridge.to_host(v)
        })
    });
    g.bench_function("rows_1000", |b| {
        b.iter(|| {
            let module = Module::new();
            let v = bridge.to_starlark(black_box(&large), module.heap());
            bridge.to_host(v)
        })
    });

    g.finish();
}

fn bench_gateway(c: &mut Criterion) {
    let gateway = Gateway::default();
    let src = HostValue::String(
        "def main(rows):\n    return [r for r in rows if r['active']]\n".into(),
    );
    let rows = make_rows(100);

    c.bench_function("gateway_filter_100", |b| {
        b.iter(|| gateway.run(vec![src.clone(), HostValue::Null, black_box(rows.clone())]))
    });
}

criterion_group!(benches, bench_bridge, bench_gateway);
criterion_main!(benches);
