//! Utilities for training networks over several epochs.

use crate::error::{Error, Result};
use crate::network::Network;

use std::time::{Duration, Instant};
use tracing::info;

/// Parameters of a single training pass.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Placeholder output a circle member reads for its predecessors from
    /// the same circle while it trains.
    pub circular_default: f64,
    /// Largest offset tried in either direction.
    pub learning_rate: f64,
    /// Number of offsets tried in each direction.
    pub granularity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            circular_default: 0.0,
            learning_rate: 0.1,
            granularity: 4,
        }
    }
}

/// A builder for training networks.
#[derive(Debug)]
pub struct Trainer {
    network: Network,
    settings: Settings,
    logging: Logging,
    stop_condition: StopCondition,
}

impl Trainer {
    /// Creates a new Trainer instance.
    ///
    /// The trainer is initialized with some default values. These defaults are:
    ///
    /// * A circular default of 0.
    /// * A learning rate of 0.1.
    /// * A granularity of 4.
    /// * Stops after 10 training iterations.
    /// * Logs on training completion.
    pub fn new(network: Network) -> Self {
        Trainer {
            network,
            settings: Settings::default(),
            logging: Logging::Completion,
            stop_condition: StopCondition::Iterations(10),
        }
    }

    /// Replaces all pass parameters at once.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the placeholder used to break circles.
    pub fn circular_default(mut self, value: f64) -> Self {
        self.settings.circular_default = value;
        self
    }

    /// Sets the largest offset tried for each parameter.
    pub fn learning_rate(mut self, rate: f64) -> Self {
        self.settings.learning_rate = rate;
        self
    }

    /// Sets the number of offsets tried in each direction.
    pub fn granularity(mut self, granularity: usize) -> Self {
        self.settings.granularity = granularity;
        self
    }

    /// Sets the type of logging to be emitted during training.
    pub fn logging(mut self, logging: Logging) -> Self {
        self.logging = logging;
        self
    }

    /// Sets the condition to finish training.
    pub fn stop_condition<C>(mut self, condition: C) -> Self
    where
        C: Into<StopCondition>,
    {
        self.stop_condition = condition.into();
        self
    }

    /// Trains the network against `reward` until the stop condition holds.
    ///
    /// Every iteration is one full training pass over `examples`, followed
    /// by scoring the network on them.
    ///
    /// Returns:
    ///   The trained network, or an error if invalid training parameters or
    ///   examples were provided. An empty `examples` slice is rejected, as
    ///   its score would be NaN.
    pub fn train<E, F>(mut self, examples: &[E], mut reward: F) -> Result<Network>
    where
        E: AsRef<[f64]>,
        F: FnMut(&[f64]) -> f64,
    {
        if examples.is_empty() {
            return Err(Error::NoExamples);
        }
        let start_time = Instant::now();
        let mut iteration = 0;
        let mut score;
        loop {
            self.network
                .train_with(examples, &self.settings, &mut reward)?;
            score = Trainer::score(&mut self.network, examples, &mut reward)?;
            iteration += 1;

            self.logging.iteration(iteration, score);
            if self.stop_condition.should_stop(iteration, score, start_time) {
                break;
            }
        }
        self.logging.completion(iteration, score, start_time);
        Ok(self.network)
    }

    /// Returns the mean reward of `network` over `examples`, or NaN when
    /// there are none.
    pub fn score<E, F>(network: &mut Network, examples: &[E], mut reward: F) -> Result<f64>
    where
        E: AsRef<[f64]>,
        F: FnMut(&[f64]) -> f64,
    {
        let mut total = 0.0;
        for example in examples {
            total += reward(&network.run(example.as_ref())?);
        }
        Ok(total / examples.len() as f64)
    }
}

/// Logging frequency to use during training
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Logging {
    /// No logs will be emitted
    Silent,
    /// A summary will be emitted at completion
    Completion,
    /// A summary will be emitted after every `n` training iterations
    Iterations(usize),
}

impl Logging {
    /// Performs logging at the current `iteration` of training.
    fn iteration(&self, iteration: usize, score: f64) {
        if let Logging::Iterations(freq) = *self {
            if freq > 0 && iteration % freq == 0 {
                info!(iteration, reward = score, "training iteration");
            }
        }
    }

    /// Performs logging at the end of training.
    fn completion(&self, iterations: usize, score: f64, start_time: Instant) {
        if let Logging::Silent = *self {
            return;
        }
        info!(
            iterations,
            seconds = start_time.elapsed().as_secs_f64(),
            reward = score,
            "training completed"
        );
    }
}

/// When to stop training
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StopCondition {
    /// Stops after the provided number of training iterations
    Iterations(usize),
    /// Stops when the mean reward reaches the provided threshold
    RewardThreshold(f64),
    /// Stops after the provided duration
    Duration(Duration),
}

impl From<Duration> for StopCondition {
    fn from(duration: Duration) -> StopCondition {
        StopCondition::Duration(duration)
    }
}

impl StopCondition {
    /// Returns true if training is complete.
    fn should_stop(&self, iteration: usize, score: f64, start_time: Instant) -> bool {
        match *self {
            StopCondition::Iterations(iterations) => iteration >= iterations,
            StopCondition::RewardThreshold(threshold) => score >= threshold,
            StopCondition::Duration(duration) => start_time.elapsed() > duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeParams;
    use approx::assert_abs_diff_eq;

    /// input -> self-looping node -> output.
    fn network() -> Network {
        let mut network = Network::new();
        let input = network.add_input();
        let circle = network.add_circle();
        let looped = network.add_circle_node(circle, NodeParams::default()).unwrap();
        let output = network.add_output(NodeParams::default());
        network.add_edge(input, looped, 1.0, 1.0).unwrap();
        network.add_edge(looped, looped, 1.0, 1.0).unwrap();
        network.add_edge(looped, output, 1.0, 1.0).unwrap();
        network
    }

    fn closeness(out: &[f64]) -> f64 {
        -(out[0] - 5.0).abs()
    }

    #[test]
    fn runs_requested_iterations() {
        let mut passes = 0;
        Trainer::new(network())
            .granularity(1)
            .logging(Logging::Silent)
            .stop_condition(StopCondition::Iterations(3))
            .train(&[vec![1.0]], |out| {
                passes += 1;
                closeness(out)
            })
            .unwrap();
        // 7 dimensions * 2 offsets, plus one scoring run, per iteration.
        assert_eq!(passes, 3 * (7 * 2 + 1));
    }

    #[test]
    fn stops_at_reward_threshold() {
        let mut network = Trainer::new(network())
            .learning_rate(1.0)
            .granularity(4)
            .logging(Logging::Iterations(1))
            .stop_condition(StopCondition::RewardThreshold(-1.0))
            .train(&[vec![2.0]], closeness)
            .unwrap();
        assert!(closeness(&network.run(&[2.0]).unwrap()) >= -1.0);
    }

    #[test]
    fn stops_after_duration() {
        let trained = Trainer::new(network())
            .logging(Logging::Silent)
            .stop_condition(Duration::from_millis(0))
            .train(&[vec![1.0]], closeness);
        assert!(trained.is_ok());
    }

    #[test]
    fn propagates_validation_errors() {
        let result = Trainer::new(network()).train(&[vec![1.0, 2.0]], closeness);
        assert_eq!(
            result.unwrap_err(),
            Error::ExampleLength {
                index: 0,
                expected: 1,
                actual: 2
            }
        );
        let result = Trainer::new(network())
            .learning_rate(-0.5)
            .train(&[vec![1.0]], closeness);
        assert_eq!(result.unwrap_err(), Error::LearningRate(-0.5));
    }

    #[test]
    fn rejects_empty_examples() {
        let mut calls = 0;
        let examples: [Vec<f64>; 0] = [];
        let result = Trainer::new(network())
            .logging(Logging::Silent)
            .stop_condition(StopCondition::RewardThreshold(0.0))
            .train(&examples, |out| {
                calls += 1;
                closeness(out)
            });
        assert_eq!(result.unwrap_err(), Error::NoExamples);
        assert_eq!(calls, 0);
    }

    #[test]
    fn score_is_mean_reward() {
        let mut network = network();
        let examples = [vec![1.0], vec![3.0]];
        let score = Trainer::score(&mut network, &examples, |out| out[0]).unwrap();
        assert_abs_diff_eq!(score, 2.0);
    }

    #[test]
    fn settings_builder() {
        let trainer = Trainer::new(network())
            .circular_default(0.5)
            .learning_rate(2.0)
            .granularity(8);
        assert_eq!(
            trainer.settings,
            Settings {
                circular_default: 0.5,
                learning_rate: 2.0,
                granularity: 8,
            }
        );
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"learning_rate": 0.5}"#).unwrap();
        assert_eq!(
            settings,
            Settings {
                learning_rate: 0.5,
                ..Settings::default()
            }
        );
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);
    }

    #[test]
    fn stop_conditions() {
        let start = Instant::now();
        assert!(!StopCondition::Iterations(2).should_stop(1, 0.0, start));
        assert!(StopCondition::Iterations(2).should_stop(2, 0.0, start));
        assert!(StopCondition::RewardThreshold(0.5).should_stop(1, 0.5, start));
        assert!(!StopCondition::RewardThreshold(0.5).should_stop(1, f64::NAN, start));
        assert!(!StopCondition::Duration(Duration::from_secs(3600)).should_stop(1, 0.0, start));
    }
}
