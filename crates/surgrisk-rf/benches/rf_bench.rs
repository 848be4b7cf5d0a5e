//! Criterion benchmarks for surgrisk-rf: forest training and batch scoring.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use surgrisk_rf::RandomForestConfig;

/// Cohort-shaped data: seven columns, roughly 7% positives.
fn make_dataset(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<bool>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..7).map(|_| rng.r#gen::<f64>()).collect();
        let eta = -3.0 + 1.5 * row[0] + row[6];
        labels.push(rng.r#gen::<f64>() < 1.0 / (1.0 + (-eta).exp()));
        features.push(row);
    }
    let names = (0..7).map(|f| format!("f{f}")).collect();
    (features, labels, names)
}

fn bench_rf_train(c: &mut Criterion) {
    let (features, labels, names) = make_dataset(800, 38);
    let cfg = RandomForestConfig::new(100).unwrap();

    c.bench_function("rf_train_800x7_100trees", |b| {
        b.iter(|| cfg.fit(&features, &labels, &names).unwrap());
    });
}

fn bench_rf_predict_batch(c: &mut Criterion) {
    let (features, labels, names) = make_dataset(800, 38);
    let forest = RandomForestConfig::new(100)
        .unwrap()
        .fit(&features, &labels, &names)
        .unwrap()
        .into_forest();

    c.bench_function("rf_predict_batch_800x7_100trees", |b| {
        b.iter(|| forest.predict_proba_batch(&features).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    let (features, labels, names) = make_dataset(800, 38);
    let cfg = RandomForestConfig::new(1).unwrap();

    c.bench_function("rf_single_tree_800x7", |b| {
        b.iter(|| cfg.fit(&features, &labels, &names).unwrap());
    });
}

criterion_group!(benches, bench_rf_train, bench_rf_predict_batch, bench_single_tree);
criterion_main!(benches);
