//! The scalar units a network is made of.

use crate::activator::Activator;

use std::fmt;

/// A handle to a node, stable for the lifetime of its network.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the position of the node in its network.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The part a node plays in its network.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Takes its output directly from the caller.
    Input,
    /// Contributes one element of the network's output.
    Output,
    /// Member of the circle with the given index.
    Circle(usize),
}

/// A weighted connection from a predecessor.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    /// Scales the predecessor's output before the input activation.
    pub weight: f64,
    /// Scales the activated contribution.
    pub second_weight: f64,
}

/// Initial activation functions and scalar parameters of a node.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct NodeParams {
    pub input_activation: Activator,
    pub output_activation: Activator,
    pub threshold: f64,
    pub global_input_weight: f64,
    pub global_output_weight: f64,
}

impl Default for NodeParams {
    fn default() -> Self {
        NodeParams {
            input_activation: Activator::Identity,
            output_activation: Activator::Identity,
            threshold: 0.0,
            global_input_weight: 1.0,
            global_output_weight: 1.0,
        }
    }
}

/// Evaluation progress of a node within a single pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Pending,
    /// On the evaluation stack; reaching it again means a cycle.
    Evaluating,
    Computed,
}

/// One tunable scalar of a node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dimension {
    Threshold,
    GlobalInputWeight,
    GlobalOutputWeight,
    /// `weight` of the edge at this position.
    Weight(usize),
    /// `second_weight` of the edge at this position.
    SecondWeight(usize),
}

/// A scalar compute unit.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) role: Role,
    pub(crate) output: f64,
    pub(crate) state: State,
    pub(crate) params: NodeParams,
    pub(crate) edges: Vec<Edge>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(role: Role, params: NodeParams) -> Self {
        Node {
            role,
            output: 0.0,
            state: State::Pending,
            params,
            edges: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the last computed output. Only meaningful while
    /// `is_computed()` holds for the current pass.
    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn is_computed(&self) -> bool {
        self.state == State::Computed
    }

    pub fn threshold(&self) -> f64 {
        self.params.threshold
    }

    pub fn global_input_weight(&self) -> f64 {
        self.params.global_input_weight
    }

    pub fn global_output_weight(&self) -> f64 {
        self.params.global_output_weight
    }

    pub fn params(&self) -> &NodeParams {
        &self.params
    }

    /// Incoming edges, in the order they were added.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns the edge arriving from `source`, if any.
    pub fn edge(&self, source: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.source == source)
    }

    /// Nodes this node feeds into.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Stores `output` and marks the node computed for the current pass.
    pub(crate) fn set_output(&mut self, output: f64) {
        self.output = output;
        self.state = State::Computed;
    }

    /// Adds or overwrites the edge from `edge.source`, keeping its position.
    /// Returns false if the edge already existed.
    pub(crate) fn connect(&mut self, edge: Edge) -> bool {
        match self.edges.iter_mut().find(|e| e.source == edge.source) {
            Some(existing) => {
                *existing = edge;
                false
            }
            None => {
                self.edges.push(edge);
                true
            }
        }
    }

    /// Returns what a predecessor with output `source_output` adds to this
    /// node's aggregate through `edge`.
    pub fn contribution(&self, edge: &Edge, source_output: f64) -> f64 {
        self.params.input_activation.f(source_output * edge.weight) * edge.second_weight
    }

    /// Turns the aggregated input `sum` into the node's output.
    ///
    /// The result is exactly `0.0` whenever the activated value falls below
    /// the node's threshold.
    pub fn activate(&self, sum: f64) -> f64 {
        let aggregate = self
            .params
            .output_activation
            .f(sum * self.params.global_input_weight)
            * self.params.global_output_weight;
        if aggregate < self.params.threshold {
            0.0
        } else {
            aggregate
        }
    }

    /// Lists the node's tunable scalars in optimization order: threshold,
    /// the two global weights, every edge weight, then every second weight.
    pub fn dimensions(&self) -> impl Iterator<Item = Dimension> {
        let edges = self.edges.len();
        [
            Dimension::Threshold,
            Dimension::GlobalInputWeight,
            Dimension::GlobalOutputWeight,
        ]
        .into_iter()
        .chain((0..edges).map(Dimension::Weight))
        .chain((0..edges).map(Dimension::SecondWeight))
    }

    /// Reads one tunable scalar, or `None` if an edge dimension is out of
    /// range.
    pub fn param(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Threshold => Some(self.params.threshold),
            Dimension::GlobalInputWeight => Some(self.params.global_input_weight),
            Dimension::GlobalOutputWeight => Some(self.params.global_output_weight),
            Dimension::Weight(i) => self.edges.get(i).map(|e| e.weight),
            Dimension::SecondWeight(i) => self.edges.get(i).map(|e| e.second_weight),
        }
    }

    pub(crate) fn set_param(&mut self, dimension: Dimension, value: f64) {
        let slot = match dimension {
            Dimension::Threshold => &mut self.params.threshold,
            Dimension::GlobalInputWeight => &mut self.params.global_input_weight,
            Dimension::GlobalOutputWeight => &mut self.params.global_output_weight,
            Dimension::Weight(i) => &mut self.edges[i].weight,
            Dimension::SecondWeight(i) => &mut self.edges[i].second_weight,
        };
        *slot = value;
    }
}
