use criterion::{black_box, criterion_group, criterion_main, Criterion};

use jackc::prelude::*;

fn criterion_benchmark(c: &mut Criterion) {
    let source = include_str!("../tests/point.jack");

    c.bench_function("compile point", |b| {
        b.iter(|| black_box(compile(black_box(source)).unwrap()))
    });

    c.bench_function("dump tokens point", |b| {
        let mut table = String::with_capacity(8 * 1024);
        b.iter(|| {
            table.clear();
            dump_tokens(black_box(source), &mut table).unwrap();
            black_box(table.len())
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
