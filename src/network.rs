//! A network of scalar nodes that may contain cycles, trained by reward
//! driven coordinate ascent.
//!
//! Nodes are grouped into inputs, outputs and *circles*: groups whose
//! members feed each other. Evaluation pulls values backwards from the
//! outputs, computing each node at most once per pass. An edge that leads
//! back into a node still being evaluated contributes nothing. While a
//! circle member trains, it reads its predecessors from the same circle as a
//! fixed placeholder instead.
//!
//! # Example
//!
//! One input feeding a self-looping node, which feeds the output:
//!
//! ```
//! # use circles::network::*;
//! # use circles::node::NodeParams;
//! let mut network = Network::new();
//! let input = network.add_input();
//! let circle = network.add_circle();
//! let looped = network.add_circle_node(circle, NodeParams::default()).unwrap();
//! let output = network.add_output(NodeParams::default());
//! network.add_edge(input, looped, 1.0, 1.0).unwrap();
//! network.add_edge(looped, looped, 1.0, 1.0).unwrap();
//! network.add_edge(looped, output, 1.0, 1.0).unwrap();
//!
//! assert_eq!(network.run(&[2.0]).unwrap(), vec![2.0]);
//!
//! // Reward outputs close to 5.
//! let examples = [TrainingExample::from(vec![2.0])];
//! network
//!     .train(&examples, 0.0, 1.0, 4, |out| -(out[0] - 5.0).abs())
//!     .unwrap();
//! assert!(network.run(&[2.0]).unwrap()[0] > 2.0);
//! ```

use crate::error::{Error, Result};
use crate::node::{Edge, Node, NodeId, NodeParams, Role, State};
use crate::optimizer::LineSearch;
use crate::trainer::Settings;

use itertools::Itertools;
use tracing::{debug, trace};

/// One training input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: Vec<f64>,
}

impl From<Vec<f64>> for TrainingExample {
    fn from(input: Vec<f64>) -> Self {
        TrainingExample { input }
    }
}

impl AsRef<[f64]> for TrainingExample {
    fn as_ref(&self) -> &[f64] {
        &self.input
    }
}

/// A cyclic network of scalar nodes.
#[derive(Clone, Debug, Default)]
pub struct Network {
    nodes: Vec<Node>,
    inputs: Vec<NodeId>,
    outputs: Vec<NodeId>,
    /// Every node whose evaluation state is cleared at the start of a pass.
    training: Vec<NodeId>,
    circles: Vec<Vec<NodeId>>,
    /// The node being trained and the placeholder it reads for its
    /// predecessors from the same circle.
    held: Option<(NodeId, f64)>,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Network::default()
    }

    /// Adds an input node. Its value is set by every call to `run`.
    pub fn add_input(&mut self) -> NodeId {
        let id = self.push(Node::new(Role::Input, NodeParams::default()));
        self.inputs.push(id);
        id
    }

    /// Adds an output node. Outputs are returned by `run` in the order they
    /// were added.
    pub fn add_output(&mut self, params: NodeParams) -> NodeId {
        let id = self.push(Node::new(Role::Output, params));
        self.outputs.push(id);
        self.training.push(id);
        id
    }

    /// Adds an empty circle and returns its index.
    pub fn add_circle(&mut self) -> usize {
        self.circles.push(Vec::new());
        self.circles.len() - 1
    }

    /// Adds a node to an existing circle.
    pub fn add_circle_node(&mut self, circle: usize, params: NodeParams) -> Result<NodeId> {
        if circle >= self.circles.len() {
            return Err(Error::UnknownCircle(circle));
        }
        let id = self.push(Node::new(Role::Circle(circle), params));
        self.circles[circle].push(id);
        self.training.push(id);
        Ok(id)
    }

    /// Connects `source` to `target`.
    ///
    /// Connecting the same pair twice overwrites the weights of the existing
    /// edge.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
        second_weight: f64,
    ) -> Result<()> {
        self.check(source)?;
        self.check(target)?;
        if self.nodes[target.0].role == Role::Input {
            return Err(Error::InputEdge(target));
        }
        let edge = Edge {
            source,
            weight,
            second_weight,
        };
        if self.nodes[target.0].connect(edge) {
            self.nodes[source.0].children.push(target);
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Output nodes and circle members.
    pub fn training_nodes(&self) -> &[NodeId] {
        &self.training
    }

    pub fn circles(&self) -> &[Vec<NodeId>] {
        &self.circles
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.inputs.len()
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.outputs.len()
    }

    /// Feeds the provided `input` through the network, returning the value of
    /// every output node.
    pub fn run(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.inputs.len() {
            return Err(Error::InputLength {
                expected: self.inputs.len(),
                actual: input.len(),
            });
        }
        Ok(self.forward(input))
    }

    /// Stores `output` on a node and marks it computed for the current pass.
    pub fn set_output(&mut self, id: NodeId, output: f64) -> Result<()> {
        self.check(id)?;
        self.nodes[id.0].set_output(output);
        Ok(())
    }

    /// Starts a new pass: every output and circle member becomes uncomputed.
    /// Input nodes keep their values.
    pub fn reset(&mut self) {
        for &id in &self.training {
            self.nodes[id.0].state = State::Pending;
        }
    }

    /// Computes a node's output within the current pass, pulling in any
    /// predecessors not yet computed, and returns it.
    pub fn calculate_output(&mut self, id: NodeId) -> Result<f64> {
        self.check(id)?;
        self.evaluate(id);
        Ok(self.nodes[id.0].output)
    }

    /// Trains every circle member against `reward`, one example at a time.
    ///
    /// For each example, the members of each circle are optimized in turn.
    /// While a member trains, its predecessors from the same circle are set
    /// to `circular_default`, and the member keeps reading that value for
    /// them on every evaluation without descending into them. Each candidate
    /// parameter value is scored by running the whole network on the example
    /// and passing its output to `reward`. Parameters change in place as soon
    /// as a member finishes, so later members train against the updated
    /// network.
    ///
    /// All examples are checked against the number of inputs before anything
    /// is evaluated.
    pub fn train<E, F>(
        &mut self,
        examples: &[E],
        circular_default: f64,
        learning_rate: f64,
        granularity: usize,
        reward: F,
    ) -> Result<()>
    where
        E: AsRef<[f64]>,
        F: FnMut(&[f64]) -> f64,
    {
        let settings = Settings {
            circular_default,
            learning_rate,
            granularity,
        };
        self.train_with(examples, &settings, reward)
    }

    /// Same as `train`, taking its parameters from `settings`.
    pub fn train_with<E, F>(
        &mut self,
        examples: &[E],
        settings: &Settings,
        mut reward: F,
    ) -> Result<()>
    where
        E: AsRef<[f64]>,
        F: FnMut(&[f64]) -> f64,
    {
        let search = LineSearch::new(settings.learning_rate, settings.granularity)?;
        self.validate(examples)?;

        for (index, example) in examples.iter().enumerate() {
            let input = example.as_ref();
            debug!(example = index, "training example");
            self.load(input);
            self.reset();
            for circle in 0..self.circles.len() {
                for position in 0..self.circles[circle].len() {
                    let id = self.circles[circle][position];
                    self.hold_circle_predecessors(id, settings.circular_default);
                    self.optimize(id, &search, |network: &mut Network| {
                        reward(&network.forward(input))
                    });
                    self.held = None;
                }
            }
        }
        Ok(())
    }

    /// Checks that every example matches the number of input nodes.
    pub fn validate<E>(&self, examples: &[E]) -> Result<()>
    where
        E: AsRef<[f64]>,
    {
        for (index, example) in examples.iter().enumerate() {
            let actual = example.as_ref().len();
            if actual != self.inputs.len() {
                return Err(Error::ExampleLength {
                    index,
                    expected: self.inputs.len(),
                    actual,
                });
            }
        }
        Ok(())
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode(id))
        }
    }

    /// Sets the input nodes. `input` must match their number.
    fn load(&mut self, input: &[f64]) {
        for (&id, &value) in self.inputs.iter().zip(input) {
            self.nodes[id.0].set_output(value);
        }
    }

    /// Runs a full pass on a pre-validated `input`.
    fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        self.load(input);
        self.reset();
        (0..self.outputs.len())
            .map(|i| {
                let id = self.outputs[i];
                if !self.nodes[id.0].is_computed() {
                    self.evaluate(id);
                }
                self.nodes[id.0].output
            })
            .collect()
    }

    fn evaluate(&mut self, id: NodeId) {
        if self.nodes[id.0].role == Role::Input {
            self.nodes[id.0].state = State::Computed;
            return;
        }
        let held = match self.held {
            Some((trainee, value)) if trainee == id => Some(value),
            _ => None,
        };
        let role = self.nodes[id.0].role;
        self.nodes[id.0].state = State::Evaluating;
        let mut sum = 0.0;
        for i in 0..self.nodes[id.0].edges.len() {
            let edge = self.nodes[id.0].edges[i];
            let source_output = match held {
                Some(value) if self.nodes[edge.source.0].role == role => value,
                _ => {
                    match self.nodes[edge.source.0].state {
                        State::Pending => self.evaluate(edge.source),
                        State::Evaluating => continue,
                        State::Computed => {}
                    }
                    self.nodes[edge.source.0].output
                }
            };
            sum += self.nodes[id.0].contribution(&edge, source_output);
        }
        let node = &mut self.nodes[id.0];
        let output = node.activate(sum);
        node.set_output(output);
    }

    /// Sets every predecessor of `id` from its own circle to `value`, and has
    /// `id` read `value` for them until `held` is cleared.
    fn hold_circle_predecessors(&mut self, id: NodeId, value: f64) {
        let role = self.nodes[id.0].role;
        let sources = self.nodes[id.0]
            .edges
            .iter()
            .map(|edge| edge.source)
            .filter(|source| self.nodes[source.0].role == role)
            .collect_vec();
        for source in sources {
            self.nodes[source.0].set_output(value);
        }
        self.held = Some((id, value));
    }

    /// Line-searches every dimension of `id` in turn, keeping the best value
    /// of each before moving to the next.
    fn optimize<R>(&mut self, id: NodeId, search: &LineSearch, mut reward: R)
    where
        R: FnMut(&mut Network) -> f64,
    {
        let dimensions = self.nodes[id.0].dimensions().collect_vec();
        for dimension in dimensions {
            let Some(original) = self.nodes[id.0].param(dimension) else {
                continue;
            };
            let (best, best_reward) = search.search(original, |value| {
                self.nodes[id.0].set_param(dimension, value);
                reward(&mut *self)
            });
            self.nodes[id.0].set_param(dimension, best);
            trace!(node = %id, ?dimension, original, best, best_reward, "dimension optimized");
        }
        debug!(node = %id, "node optimized");
    }
}
