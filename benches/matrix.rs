use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mnist_nn::{one_hot, train_step, Dataset, LogisticRegression, Matrix, TwoLayerNet};

const EXAMPLES: usize = 256;
const FEATURES: usize = 785;
const HIDDEN: usize = 100;
const CLASSES: usize = 10;

fn random_matrix(rows: usize, cols: usize, seed: u64) -> Matrix {
    let mut m = Matrix::zeros(rows, cols).unwrap();
    m.fill_random(&mut StdRng::seed_from_u64(seed));
    m
}

fn batch() -> Dataset {
    let x = random_matrix(EXAMPLES, FEATURES, 0);
    let labels: Vec<f64> = (0..EXAMPLES).map(|i| (i % CLASSES) as f64).collect();
    let labels = Matrix::from_flat(labels, 1).unwrap();
    Dataset::new(x, one_hot(&labels, CLASSES).unwrap()).unwrap()
}

fn matmul_bench(c: &mut Criterion) {
    let x = random_matrix(EXAMPLES, FEATURES, 1);
    let w = random_matrix(FEATURES, HIDDEN, 2);
    let d = random_matrix(EXAMPLES, HIDDEN, 3);

    c.bench_function("matmul_256x785_785x100", |b| {
        b.iter(|| black_box(x.matmul(black_box(&w)).unwrap()))
    });
    c.bench_function("t_matmul_785x256_256x100", |b| {
        b.iter(|| black_box(x.t_matmul(black_box(&d)).unwrap()))
    });
}

fn train_step_bench(c: &mut Criterion) {
    let data = batch();

    let mut logistic = LogisticRegression::new(FEATURES, CLASSES).unwrap();
    c.bench_function("logistic_step_256x785", |b| {
        b.iter(|| black_box(train_step(&mut logistic, black_box(&data), 1e-5).unwrap()))
    });

    let mut net = TwoLayerNet::new_with_seed(FEATURES, HIDDEN, CLASSES, 0).unwrap();
    c.bench_function("two_layer_step_256x785_100_10", |b| {
        b.iter(|| black_box(train_step(&mut net, black_box(&data), 1e-2).unwrap()))
    });
}

criterion_group!(benches, matmul_bench, train_step_bench);
criterion_main!(benches);
