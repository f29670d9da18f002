//! Error types.

use crate::node::NodeId;

/// Errors reported by network construction, evaluation and training.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// `run` was handed an input of the wrong length.
    #[error("expected {expected} inputs, got {actual}")]
    InputLength { expected: usize, actual: usize },
    /// A training example does not match the number of input nodes.
    #[error("training example {index} has {actual} inputs, expected {expected}")]
    ExampleLength {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// Multi-epoch training needs at least one example to score against.
    #[error("no training examples")]
    NoExamples,
    #[error("learning rate must be positive and finite, got {0}")]
    LearningRate(f64),
    #[error("granularity must be at least 1")]
    Granularity,
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("circle {0} does not exist")]
    UnknownCircle(usize),
    /// Input nodes take their value from the caller and have no predecessors.
    #[error("input node {0} cannot have incoming edges")]
    InputEdge(NodeId),
    #[error("invalid topology: {0}")]
    Topology(String),
}

pub type Result<T> = std::result::Result<T, Error>;
