use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

use mnist_nn::mnist::{self, CLASSES};
use mnist_nn::{
    evaluate, fit, one_hot, BatchMode, Dataset, FitConfig, LogisticRegression, Matrix, Model,
    Shuffle, TwoLayerNet,
};

/// Train a from-scratch classifier on MNIST and report test accuracy.
#[derive(Debug, Parser)]
#[command(name = "mnist-nn", version)]
struct Cli {
    /// Directory holding the four `*-ubyte` IDX files.
    #[arg(long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Use only the first N examples of each split.
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Print the first N training digits before training.
    #[arg(long, global = true, default_value_t = 0)]
    preview: usize,

    /// Scale pixel intensities from 0-255 down to 0-1.
    #[arg(long, global = true)]
    normalize: bool,

    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sigmoid logistic regression, full-batch gradient descent.
    Logistic {
        #[arg(long, default_value_t = 20)]
        iterations: usize,
        #[arg(long, default_value_t = 1e-5)]
        lr: f64,
    },
    /// Sigmoid hidden layer + softmax output.
    TwoLayer {
        #[arg(long, default_value_t = 1)]
        epochs: usize,
        #[arg(long, default_value_t = 1e-2)]
        lr: f64,
        #[arg(long, default_value_t = 100)]
        hidden: usize,
        /// Minibatch size; omit for full-batch training.
        #[arg(long)]
        batch_size: Option<usize>,
        /// Seed for weight initialization.
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Reshuffle minibatches every epoch with this seed.
        #[arg(long)]
        shuffle_seed: Option<u64>,
    },
}

struct Split {
    images: Matrix,
    labels: Matrix,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> mnist_nn::Result<()> {
    let train = load_split(&cli.data_dir, "train", cli.limit)?;
    for idx in 0..cli.preview.min(train.images.rows()) {
        println!("{}", mnist::render_digit(&train.images, &train.labels, idx)?);
    }
    let test = load_split(&cli.data_dir, "t10k", cli.limit)?;

    let train = into_dataset(train, cli.normalize)?;
    let test = into_dataset(test, cli.normalize)?;
    log::info!(
        "loaded {} training and {} test examples with {} features",
        train.len(),
        test.len(),
        train.features()
    );

    match cli.command {
        Command::Logistic { iterations, lr } => {
            let mut model = LogisticRegression::new(train.features(), CLASSES)?;
            let cfg = FitConfig {
                epochs: iterations,
                lr,
                ..FitConfig::default()
            };
            fit(&mut model, &train, &cfg)?;
            report(&model, &test)
        }
        Command::TwoLayer {
            epochs,
            lr,
            hidden,
            batch_size,
            seed,
            shuffle_seed,
        } => {
            let mut net = TwoLayerNet::new_with_seed(train.features(), hidden, CLASSES, seed)?;
            let cfg = FitConfig {
                epochs,
                lr,
                batch: match batch_size {
                    Some(size) => BatchMode::Mini { size },
                    None => BatchMode::Full,
                },
                shuffle: match shuffle_seed {
                    Some(seed) => Shuffle::Seeded(seed),
                    None => Shuffle::None,
                },
            };
            fit(&mut net, &train, &cfg)?;
            report(&net, &test)
        }
    }
}

fn load_split(dir: &Path, prefix: &str, limit: Option<usize>) -> mnist_nn::Result<Split> {
    let images = mnist::read_images(dir.join(format!("{prefix}-images.idx3-ubyte")))?;
    let labels = mnist::read_labels(dir.join(format!("{prefix}-labels.idx1-ubyte")))?;

    Ok(match limit {
        Some(n) => Split {
            images: images.slice_rows(0, n.min(images.rows()))?,
            labels: labels.slice_rows(0, n.min(labels.rows()))?,
        },
        None => Split { images, labels },
    })
}

fn into_dataset(split: Split, normalize: bool) -> mnist_nn::Result<Dataset> {
    let images = if normalize {
        mnist::normalize_pixels(&split.images)?
    } else {
        split.images
    };
    Dataset::new(images, one_hot(&split.labels, CLASSES)?)
}

fn report<M: Model>(model: &M, test: &Dataset) -> mnist_nn::Result<()> {
    let eval = evaluate(model, test)?;
    println!("Test loss: {:.6}", eval.loss);
    println!("Accuracy: {}%", eval.accuracy);
    Ok(())
}
