use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mnist_nn::{
    evaluate, fit, one_hot, BatchMode, Dataset, FitConfig, Matrix, Shuffle, TwoLayerNet,
};

fn main() -> mnist_nn::Result<()> {
    // Tiny synthetic 3-class dataset in 2D, with a leading bias column.
    // Each class is a blob around a different center.
    let mut rng = StdRng::seed_from_u64(0);

    let centers = [[-1.0_f64, -1.0], [1.0, -1.0], [0.0, 1.0]];
    let n_per_class = 128;
    let mut xs = Vec::with_capacity(3 * n_per_class);
    let mut labels = Vec::with_capacity(3 * n_per_class);

    for (class, center) in centers.iter().enumerate() {
        for _ in 0..n_per_class {
            // Uniform noise is good enough for a learning example.
            let x0 = center[0] + rng.gen_range(-0.3..0.3);
            let x1 = center[1] + rng.gen_range(-0.3..0.3);
            xs.push(vec![1.0, x0, x1]);
            labels.push(vec![class as f64]);
        }
    }

    let labels = Matrix::from_rows(&labels)?;
    let train = Dataset::new(Matrix::from_rows(&xs)?, one_hot(&labels, 3)?)?;

    let mut net = TwoLayerNet::new_with_seed(3, 16, 3, 0)?;
    let report = fit(
        &mut net,
        &train,
        &FitConfig {
            epochs: 200,
            lr: 0.5,
            batch: BatchMode::Mini { size: 32 },
            shuffle: Shuffle::Seeded(0),
        },
    )?;

    let epoch_losses = report.epoch_losses();
    println!(
        "first_epoch_loss={} last_epoch_loss={}",
        epoch_losses[0],
        epoch_losses[epoch_losses.len() - 1]
    );

    let eval = evaluate(&net, &train)?;
    println!("evaluate: loss={} accuracy={}%", eval.loss, eval.accuracy);

    Ok(())
}
