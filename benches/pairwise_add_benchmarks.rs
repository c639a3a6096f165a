use cim_catcontext::{
    add_categories, combine_pairs, configure_registry, CategoryScope, Column, Dataset,
    DefaultOperations, Operand, Operations, ScopeConfig, Value,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;

const CITIES: [&str; 8] = [
    "Austin", "Boise", "Denver", "Fresno", "Laredo", "Reno", "Tulsa", "Waco",
];

fn random_rows(rows: usize) -> (Vec<Value>, Vec<Value>) {
    let mut rng = rand::thread_rng();
    let cities = (0..rows)
        .map(|_| Value::from(CITIES[rng.gen_range(0..CITIES.len())]))
        .collect();
    let codes = (0..rows).map(|_| Value::Int(rng.gen_range(0..16))).collect();
    (cities, codes)
}

fn benchmark_categorical_pairwise_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("categorical_pairwise_add");

    for rows in [1_000, 10_000, 100_000].iter() {
        let (cities, codes) = random_rows(*rows);
        let x = Column::categorical("city", cities);
        let y = Column::categorical("code", codes);

        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| combine_pairs(black_box(&x), black_box(&y), add_categories).unwrap());
        });
    }

    group.finish();
}

fn benchmark_plain_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("plain_add");

    for rows in [1_000, 10_000, 100_000].iter() {
        let (cities, codes) = random_rows(*rows);
        let codes: Vec<Value> = codes
            .into_iter()
            .map(|v| Value::Str(v.to_string()))
            .collect();
        let frame = Dataset::new(vec![
            Column::from_values("city", cities),
            Column::from_values("code", codes),
        ])
        .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(rows), rows, |b, _| {
            b.iter(|| {
                let lhs = frame.series("city").unwrap();
                let rhs = frame.series("code").unwrap();
                DefaultOperations
                    .add(black_box(lhs), Operand::Series(rhs))
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_scope_round_trip(c: &mut Criterion) {
    let (cities, codes) = random_rows(10_000);
    let frame = Dataset::new(vec![
        Column::from_values("city", cities),
        Column::from_values("code", codes),
    ])
    .unwrap();

    c.bench_function("scope_enter_exit_10k", |b| {
        b.iter(|| {
            let mut registry = configure_registry([("df", frame.clone())]);
            let mut scope =
                CategoryScope::new(&mut registry, ["df"], ScopeConfig::default()).unwrap();
            scope.enter().unwrap().exit().unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_categorical_pairwise_add,
    benchmark_plain_add,
    benchmark_scope_round_trip
);

criterion_main!(benches);
