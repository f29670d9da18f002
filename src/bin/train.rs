use circles::activator::Activator;
use circles::builder::{Initializer, NetworkBuilder};
use circles::trainer::*;
use circles::{Network, TrainingExample};

use rand::distributions::{Distribution, Uniform};
use tracing_subscriber::EnvFilter;

/// Output level the network learns to hold, whatever its input.
const TARGET: f64 = 0.5;
const TOLERANCE: f64 = 0.05;

fn generate_data(num_samples: usize) -> Vec<TrainingExample> {
    let mut rng = rand::thread_rng();
    let inputs = Uniform::new(-1.0, 1.0);
    (0..num_samples)
        .map(|_| vec![inputs.sample(&mut rng), inputs.sample(&mut rng)].into())
        .collect()
}

fn reward(output: &[f64]) -> f64 {
    -(output[0] - TARGET) * (output[0] - TARGET)
}

fn score(
    set_name: &str,
    network: &mut Network,
    data: &[TrainingExample],
) -> circles::Result<()> {
    let mut num_correct = 0;
    for example in data {
        let output = network.run(&example.input)?;
        if (output[0] - TARGET).abs() < TOLERANCE {
            num_correct += 1;
        }
    }
    println!(
        "{} set results: {} of {} within {} of {}",
        set_name,
        num_correct,
        data.len(),
        TOLERANCE,
        TARGET
    );
    Ok(())
}

fn main() -> circles::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let network = NetworkBuilder::new(2, 2, 3, 1)
        .input_activation(Activator::TanH)
        .output_activation(Activator::Sigmoid)
        .initializer(Initializer::Uniform {
            low: -1.0,
            high: 1.0,
        })
        .seed(42)
        .build()?;

    let training_data = generate_data(20);
    let mut network = Trainer::new(network)
        .learning_rate(0.5)
        .granularity(5)
        .circular_default(0.5)
        .logging(Logging::Iterations(1))
        .stop_condition(StopCondition::Iterations(20))
        .train(&training_data, reward)?;

    println!();
    score("Training", &mut network, &training_data)?;
    score("Test", &mut network, &generate_data(200))?;
    Ok(())
}
