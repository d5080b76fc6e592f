use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlweave::{
    ColumnInfo, ColumnType, Compiler, EntityMetadata, MySql, Predicate, Query, SqlBuilder,
    SqlServer, col,
};

/// Metadata with `n` integer columns named `Col0`, `Col1`, ...
fn wide_metadata(n: usize) -> EntityMetadata {
    let mut meta = EntityMetadata::new("Wide", "Wide")
        .schema("dbo")
        .column(
            ColumnInfo::new("id", ColumnType::Int)
                .column_name("Id")
                .primary_key()
                .identity(),
        );
    for i in 0..n {
        meta = meta.column(
            ColumnInfo::new(format!("col{i}"), ColumnType::Int)
                .column_name(format!("Col{i}")),
        );
    }
    meta
}

/// `col0 = 0 OR col1 = 1 OR ...`
fn or_chain(n: usize) -> Predicate {
    (0..n)
        .map(|i| Predicate::equal_to(format!("col{i}"), i as i64))
        .reduce(|acc, p| acc | p)
        .unwrap_or_else(|| Predicate::is_null("id"))
}

fn bench_compile_predicate(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/predicate");

    for n in [1, 5, 10, 50] {
        let meta = wide_metadata(n);
        let predicate = or_chain(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &predicate, |b, predicate| {
            let compiler = Compiler::new(&SqlServer, &meta);
            b.iter(|| black_box(compiler.compile(predicate)));
        });
    }

    group.finish();
}

fn bench_compile_expr(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/expr");

    for n in [1, 5, 10, 50] {
        let meta = wide_metadata(n);
        let expr = (0..n)
            .map(|i| col(format!("col{i}")).gt(i as i64))
            .reduce(|acc, e| acc.and(e))
            .unwrap_or_else(|| col("id").is_not_null());
        group.bench_with_input(BenchmarkId::from_parameter(n), &expr, |b, expr| {
            let compiler = Compiler::new(&MySql, &meta);
            b.iter(|| black_box(compiler.compile_expr(expr)));
        });
    }

    group.finish();
}

fn bench_paged_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder/paged_select");

    for n in [5, 20, 100] {
        let meta = wide_metadata(n);
        let query = Query::new()
            .filter(or_chain(n.min(10)))
            .order_by("id")
            .skip(40)
            .take(20);
        group.bench_with_input(BenchmarkId::from_parameter(n), &query, |b, query| {
            let builder = SqlBuilder::new(&SqlServer, &meta);
            b.iter(|| black_box(builder.select(query)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile_predicate, bench_compile_expr, bench_paged_select);
criterion_main!(benches);
