use criterion::{criterion_group, criterion_main, Criterion};
use graphload_engine::{rewrite_batch, rewrite_statements, RewriteConfig, TypeMap};
use std::hint::black_box;

const GRAPH_TABLE: &str = "dm_temai.shop_gandalf_v1_3_graph_structure_di";
const STATEMENT_COUNT: usize = 200;
const GROUP_COUNT: usize = 20;
const FEATURE_COUNT: usize = 40;

fn bench_rewrite_batch(c: &mut Criterion) {
    let sql = seed_batch();
    let type_map = seed_type_map();
    let config = RewriteConfig::default();

    c.bench_function("rewrite_batch_200_statements", |b| {
        b.iter(|| {
            let outputs =
                rewrite_batch(black_box(&sql), &type_map, &config).expect("batch should rewrite");
            black_box(outputs);
        });
    });
}

fn bench_rewrite_statements(c: &mut Criterion) {
    let sql = seed_batch();

    c.bench_function("rewrite_statements_200_statements", |b| {
        b.iter(|| {
            let rendered =
                rewrite_statements(black_box(&sql), false).expect("statements should rewrite");
            black_box(rendered);
        });
    });
}

fn seed_batch() -> String {
    let features = (0..FEATURE_COUNT)
        .map(|idx| format!("feature_{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    (0..STATEMENT_COUNT)
        .map(|idx| {
            let group = idx % GROUP_COUNT;
            format!(
                "SELECT DISTINCT src AS point1_id, tgt AS point2_id, src_kind AS point1_type, \
                 'sim' AS point2_type, '' AS value, concat(src_kind, '_sim_{group}') AS edge_type, \
                 {features} FROM {GRAPH_TABLE} \
                 WHERE date = max_pt('{GRAPH_TABLE}') AND src_kind = 'shop' AND rel = 'r{idx}'"
            )
        })
        .collect::<Vec<_>>()
        .join(";\n")
}

fn seed_type_map() -> TypeMap {
    let mut type_map = TypeMap::new();
    for group in 0..GROUP_COUNT {
        for idx in (0..FEATURE_COUNT).step_by(2) {
            type_map.insert(format!("shop_sim_{group}"), format!("feature_{idx}"), "double");
        }
    }
    type_map
}

criterion_group!(benches, bench_rewrite_batch, bench_rewrite_statements);
criterion_main!(benches);
