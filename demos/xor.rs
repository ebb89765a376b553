//! Train a small network on XOR and print what it learned.
//!
//! Run with: cargo run --example xor
//! Set RUST_LOG=debug for initializer and backend details.

use ffnet::builders::NetworkBuilder;
use ffnet::config::TrainingConfig;
use ffnet::data::Dataset;
use ffnet::train::Trainer;
use ndarray::array;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dataset = Dataset::new(
        array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
        vec![0, 1, 1, 0],
    )?;

    let mut network = NetworkBuilder::new(&[2, 4, 2])
        .learning_rate(0.5)
        .seed(7)
        .build()?;

    let trainer = Trainer::new(TrainingConfig {
        epochs: 4000,
        log_every: 0,
    })?;

    let reports = trainer.fit(&mut network, &dataset)?;
    if let Some(last) = reports.last() {
        println!("final epoch: accuracy {:.2}, mean loss {:.6}", last.accuracy, last.mean_loss);
    }

    println!("\nInput      Output           Guess");
    for (features, label) in dataset.iter() {
        let guess = network.forward(features)?;
        let output = network.output();
        println!(
            "{:?}  [{:.3}, {:.3}]   {} (expected {})",
            features, output[0], output[1], guess, label
        );
    }

    Ok(())
}
