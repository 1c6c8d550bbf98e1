//! Inhabitation search benchmarks.
//!
//! Compares cold searches (fresh cache) with warm lookups, and measures how
//! search cost grows with the number of unary functions in scope.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tgen::{
    Engine, EngineConfig, FunctionSignature, Language, Type, TypeContext, TypeParameter,
};

/// A chain `T0 -> T1 -> ... -> Tn` of converter functions plus a seed
/// variable of type `T0`.
fn chain_context(length: usize) -> TypeContext {
    let mut ctx = TypeContext::new(Language::TypeScript).with_variable("seed", Type::named("T0"));
    for i in 0..length {
        ctx.add_function(FunctionSignature::new(
            format!("step{i}"),
            vec![TypeParameter::new("value", Type::named(format!("T{i}")))],
            Type::named(format!("T{}", i + 1)),
        ));
    }
    ctx
}

/// Many unrelated functions in scope, only a few of which matter.
fn noisy_context(functions: usize) -> TypeContext {
    let mut ctx = TypeContext::new(Language::TypeScript)
        .with_variable("n", Type::number())
        .with_variable("s", Type::string());
    for i in 0..functions {
        let (param, ret) = match i % 3 {
            0 => (Type::number(), Type::string()),
            1 => (Type::string(), Type::named(format!("R{i}"))),
            _ => (Type::named(format!("R{i}")), Type::boolean()),
        };
        ctx.add_function(FunctionSignature::new(
            format!("f{i}"),
            vec![TypeParameter::new("value", param)],
            ret,
        ));
    }
    ctx
}

fn bench_cold_vs_warm(c: &mut Criterion) {
    let ctx = chain_context(4);
    let target = Type::named("T4");

    c.bench_function("inhabitation_cold", |b| {
        b.iter(|| {
            let solver = Engine::new(EngineConfig::uncached())
                .solver(Language::TypeScript)
                .expect("typescript is registered");
            solver.find_best_path(&Type::unknown(), black_box(&target), &ctx)
        })
    });

    let engine = Engine::default();
    let solver = engine
        .solver(Language::TypeScript)
        .expect("typescript is registered");
    solver.find_best_path(&Type::unknown(), &target, &ctx);
    c.bench_function("inhabitation_warm", |b| {
        b.iter(|| solver.find_best_path(&Type::unknown(), black_box(&target), &ctx))
    });
}

fn bench_scope_size(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::uncached());
    let solver = engine
        .solver(Language::TypeScript)
        .expect("typescript is registered");

    let mut group = c.benchmark_group("inhabitation_scope");
    for functions in [10usize, 100, 500] {
        let ctx = noisy_context(functions);
        group.bench_with_input(BenchmarkId::from_parameter(functions), &ctx, |b, ctx| {
            b.iter(|| solver.find_paths(&Type::unknown(), black_box(&Type::boolean()), ctx, 8))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cold_vs_warm, bench_scope_size);
criterion_main!(benches);
