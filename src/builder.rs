//! Builds networks with a fixed layered topology: the inputs feed a chain of
//! circles, and the last circle feeds the outputs.
//!
//! ```
//! # use circles::builder::NetworkBuilder;
//! # use circles::activator::Activator;
//! let mut network = NetworkBuilder::new(2, 3, 4, 1)
//!     .output_activation(Activator::TanH)
//!     .build()
//!     .unwrap();
//! assert_eq!(network.circles().len(), 3);
//! assert_eq!(network.run(&[0.5, -0.5]).unwrap().len(), 1);
//! ```

use crate::activator::Activator;
use crate::error::{Error, Result};
use crate::network::Network;
use crate::node::{NodeId, NodeParams};

use itertools::Itertools;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// How edge weights are initialized.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Initializer {
    /// Both factors of every edge start at the builder's default weight.
    Constant,
    /// Both factors of every edge are drawn independently from
    /// `[low, high)`.
    Uniform { low: f64, high: f64 },
}

/// Builds a new `Network`.
#[derive(Clone, Debug)]
pub struct NetworkBuilder {
    inputs: usize,
    circles: usize,
    circle_size: usize,
    outputs: usize,
    input_activation: Activator,
    output_activation: Activator,
    default_weight: f64,
    default_threshold: f64,
    initializer: Initializer,
    seed: u64,
}

impl NetworkBuilder {
    /// Creates a new builder.
    ///
    /// Arguments:
    ///  * `inputs` - the number of input nodes.
    ///  * `circles` - the number of circles chained between inputs and
    ///                outputs.
    ///  * `circle_size` - the number of nodes in every circle.
    ///  * `outputs` - the number of output nodes.
    ///
    /// The builder starts with identity activations, a default weight of 1, a
    /// default threshold of 0 and constant initialization.
    pub fn new(inputs: usize, circles: usize, circle_size: usize, outputs: usize) -> Self {
        NetworkBuilder {
            inputs,
            circles,
            circle_size,
            outputs,
            input_activation: Activator::Identity,
            output_activation: Activator::Identity,
            default_weight: 1.0,
            default_threshold: 0.0,
            initializer: Initializer::Constant,
            seed: 0,
        }
    }

    /// Sets the function applied to each weighted incoming value.
    pub fn input_activation(mut self, activator: Activator) -> Self {
        self.input_activation = activator;
        self
    }

    /// Sets the function applied to each node's aggregate.
    pub fn output_activation(mut self, activator: Activator) -> Self {
        self.output_activation = activator;
        self
    }

    pub fn default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    pub fn default_threshold(mut self, threshold: f64) -> Self {
        self.default_threshold = threshold;
        self
    }

    pub fn initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = initializer;
        self
    }

    /// Seeds random initialization, making it reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builds the network, or returns an error describing the first invalid
    /// setting.
    pub fn build(&self) -> Result<Network> {
        self.validate()?;
        let mut weights = Weights::new(self.initializer, self.default_weight, self.seed);
        let params = NodeParams {
            input_activation: self.input_activation,
            output_activation: self.output_activation,
            threshold: self.default_threshold,
            ..NodeParams::default()
        };

        let mut network = Network::new();
        let inputs = (0..self.inputs).map(|_| network.add_input()).collect_vec();
        let mut circles = Vec::with_capacity(self.circles);
        for _ in 0..self.circles {
            let circle = network.add_circle();
            let members = (0..self.circle_size)
                .map(|_| network.add_circle_node(circle, params))
                .collect::<Result<Vec<NodeId>>>()?;
            circles.push(members);
        }
        let outputs = (0..self.outputs)
            .map(|_| network.add_output(params))
            .collect_vec();

        for members in &circles {
            for (from, to) in members.iter().copied().circular_tuple_windows() {
                weights.connect(&mut network, from, to)?;
            }
        }
        for (current, next) in circles.iter().tuple_windows() {
            for (&from, &to) in current.iter().zip(next) {
                weights.connect(&mut network, from, to)?;
            }
        }
        // validate() guarantees at least one circle.
        if let (Some(first), Some(last)) = (circles.first(), circles.last()) {
            for (&from, &to) in last.iter().cartesian_product(&outputs) {
                weights.connect(&mut network, from, to)?;
            }
            for (&from, &to) in inputs.iter().cartesian_product(first) {
                weights.connect(&mut network, from, to)?;
            }
        }
        Ok(network)
    }

    fn validate(&self) -> Result<()> {
        for &(count, name) in &[
            (self.inputs, "inputs"),
            (self.circles, "circles"),
            (self.circle_size, "circle size"),
            (self.outputs, "outputs"),
        ] {
            if count == 0 {
                return Err(Error::Topology(format!("{} must be at least 1", name)));
            }
        }
        if let Initializer::Uniform { low, high } = self.initializer {
            if !(low < high) || !low.is_finite() || !high.is_finite() {
                return Err(Error::Topology(format!(
                    "empty weight range [{}, {})",
                    low, high
                )));
            }
            // Uniform sampling scales the width by just over 1, so it must stay
            // finite after that.
            if !((high - low) / (1.0 - f64::EPSILON / 2.0)).is_finite() {
                return Err(Error::Topology(format!(
                    "weight range [{}, {}) is too wide to sample",
                    low, high
                )));
            }
        }
        Ok(())
    }
}

/// Source of initial edge weights.
enum Weights {
    Constant(f64),
    Uniform(Uniform<f64>, StdRng),
}

impl Weights {
    fn new(initializer: Initializer, default_weight: f64, seed: u64) -> Self {
        match initializer {
            Initializer::Constant => Weights::Constant(default_weight),
            Initializer::Uniform { low, high } => {
                Weights::Uniform(Uniform::new(low, high), StdRng::seed_from_u64(seed))
            }
        }
    }

    fn next(&mut self) -> f64 {
        match self {
            Weights::Constant(weight) => *weight,
            Weights::Uniform(range, rng) => range.sample(rng),
        }
    }

    fn connect(&mut self, network: &mut Network, from: NodeId, to: NodeId) -> Result<()> {
        let weight = self.next();
        let second_weight = self.next();
        network.add_edge(from, to, weight, second_weight)
    }
}
