use mnist_nn::{evaluate, fit, Dataset, FitConfig, LogisticRegression, Matrix, Model};

fn main() -> mnist_nn::Result<()> {
    // Two clusters on either side of the line x0 + x1 = 0.
    // The first column is the bias.
    let xs = vec![
        vec![1.0, -2.0, -1.0],
        vec![1.0, -1.5, -2.5],
        vec![1.0, -3.0, -0.5],
        vec![1.0, -2.2, -2.0],
        vec![1.0, 2.0, 1.0],
        vec![1.0, 1.5, 2.5],
        vec![1.0, 3.0, 0.5],
        vec![1.0, 2.2, 2.0],
    ];
    let ys = vec![
        vec![0.0],
        vec![0.0],
        vec![0.0],
        vec![0.0],
        vec![1.0],
        vec![1.0],
        vec![1.0],
        vec![1.0],
    ];
    let train = Dataset::new(Matrix::from_rows(&xs)?, Matrix::from_rows(&ys)?)?;

    let mut model = LogisticRegression::new(3, 1)?;
    let report = fit(
        &mut model,
        &train,
        &FitConfig {
            epochs: 100,
            lr: 0.1,
            ..FitConfig::default()
        },
    )?;

    println!(
        "first_loss={} final_loss={}",
        report.steps[0].loss, report.final_loss
    );
    println!("weights:\n{}", model.weights());

    let eval = evaluate(&model, &train)?;
    println!("accuracy={}%", eval.accuracy);

    let probe = Matrix::from_rows(&[vec![1.0, -0.5, -0.5], vec![1.0, 0.5, 0.5]])?;
    println!("classify(probe):\n{}", model.classify(&probe)?);

    Ok(())
}
