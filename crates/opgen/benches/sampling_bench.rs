//! Criterion microbenches for random-walk sampling.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use opgen::api::{
    GeneratorCache, RandomRegressionWalkSampler, RandomTaskGenerator, RandomTaskParams,
    RandomWalkSampler, WalkCfg, WalkHooks,
};

fn bench_walks(c: &mut Criterion) {
    let mut group = c.benchmark_group("walks");
    let params = RandomTaskParams {
        num_variables: 30,
        num_operators: 500,
        goal_size: 4,
        ..RandomTaskParams::default()
    };
    let task = RandomTaskGenerator::generate_single(&params, 99).unwrap();
    let cache = GeneratorCache::new();
    let cfg = WalkCfg {
        deprioritize_undoing_steps: true,
        ..WalkCfg::default()
    };

    group.bench_function(BenchmarkId::new("forward", "len20"), |b| {
        b.iter_batched(
            || RandomWalkSampler::new(&task, &cache, 1),
            |mut sampler| {
                let start = task.initial_state();
                sampler.sample_state_length(&start, 20, &cfg, &WalkHooks::default())
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function(BenchmarkId::new("backward", "len20"), |b| {
        b.iter_batched(
            || RandomRegressionWalkSampler::new(&task, &cache, 1),
            |mut sampler| {
                let goal = task.goal_assignment();
                sampler.sample_state_length(&goal, 20, &cfg, &WalkHooks::default())
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function(BenchmarkId::new("area", "cost3"), |b| {
        let sampler = RandomRegressionWalkSampler::new(&task, &cache, 1);
        let goal = task.goal_assignment();
        b.iter(|| sampler.sample_area(&goal, 3, Some(5000), false).costs.len())
    });
    group.finish();
}

criterion_group!(benches, bench_walks);
criterion_main!(benches);
