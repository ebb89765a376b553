//! Train and evaluate on IDX image/label files (for example the MNIST digit set).
//!
//! Usage:
//!   cargo run --release --example train_idx -- <train-images> <train-labels> <test-images> <test-labels> [config.json]
//!
//! The optional JSON file uses the `ExperimentConfig` layout; without it the defaults apply
//! (784-256-10, learning rate 0.01, four epochs on the CPU backend).

use std::env;
use std::process;
use std::time::Instant;

use ffnet::builders::NetworkBuilder;
use ffnet::config::ExperimentConfig;
use ffnet::data::Dataset;
use ffnet::train::Trainer;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 5 {
        eprintln!(
            "usage: {} <train-images> <train-labels> <test-images> <test-labels> [config.json]",
            args.first().map(String::as_str).unwrap_or("train_idx")
        );
        process::exit(2);
    }

    if let Err(err) = run(&args[1..]) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn run(args: &[String]) -> ffnet::Result<()> {
    let config = match args.get(4) {
        Some(path) => ExperimentConfig::from_json_file(path)?,
        None => ExperimentConfig::default(),
    };

    let train = Dataset::from_idx(&args[0], &args[1])?;
    let test = Dataset::from_idx(&args[2], &args[3])?;

    let mut network = NetworkBuilder::from_config(&config.network).build_dynamic()?;
    println!("{}", network.backend().device_info()?);
    println!(
        "topology {:?}, {} parameters, learning rate {}",
        network.topology(),
        network.parameter_count(),
        network.learning_rate()
    );

    let trainer = Trainer::new(config.training.clone())?;
    let start = Instant::now();
    for report in trainer.fit(&mut network, &train)? {
        println!(
            "epoch {}: {}/{} correct ({:.2}%), mean loss {:.6}",
            report.epoch,
            report.correct,
            report.samples,
            report.accuracy * 100.0,
            report.mean_loss
        );
    }
    println!("training took {:.1?}", start.elapsed());

    let evaluation = trainer.evaluate(&mut network, &test)?;
    println!(
        "test set: {}/{} correct ({:.2}%)",
        evaluation.correct,
        evaluation.samples,
        evaluation.accuracy * 100.0
    );
    Ok(())
}
