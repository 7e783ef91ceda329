use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fastrand::Rng;
use statemerge::{
    prelude::*,
    random::{alphabet, random_reference, random_sample},
};

fn learning(c: &mut Criterion) {
    let mut group = c.benchmark_group("learn");
    group.sample_size(20);

    for states in [8, 16, 32] {
        let mut rng = Rng::with_seed(states as u64);
        let reference = random_reference(&mut rng, 3, states, 0.4, 0.2);
        let sample = random_sample(&mut rng, &reference, &alphabet(3), states * 10, states);

        for (name, parallel) in [("sequential", false), ("parallel", true)] {
            let config = LearnerConfig::default().with_parallel(parallel);
            group.bench_with_input(BenchmarkId::new(name, states), &sample, |b, sample| {
                b.iter(|| learn(black_box(sample), config.clone()))
            });
        }
    }
    group.finish();
}

fn scoring(c: &mut Criterion) {
    let mut rng = Rng::with_seed(17);
    let reference = random_reference(&mut rng, 2, 24, 0.3, 0.2);
    let sample = random_sample(&mut rng, &reference, &alphabet(2), 400, 20);
    let Ok(tree) = PrefixTreeBuilder::from_sample(&sample, ConflictPolicy::Abort) else {
        return;
    };
    let root = tree.initial();
    let pairs = tree
        .edges(root)
        .map(|(_, child)| StatePair::new(child, root))
        .collect::<Vec<_>>();

    c.bench_function("score root children", |b| {
        b.iter(|| {
            pairs
                .iter()
                .map(|pair| ScoringStrategy::Edsm.score(black_box(&tree), *pair))
                .collect::<Vec<_>>()
        })
    });
}

criterion_group!(benches, learning, scoring);
criterion_main!(benches);
