//! Cyclic networks of scalar nodes, trained without gradients.
//!
//! A [`Network`](network::Network) holds input nodes, output nodes and
//! *circles* of nodes that feed each other. Training searches each circle
//! member's parameters one at a time, keeping whichever nearby value earns
//! the best score from a caller supplied reward function.

#[macro_use]
extern crate serde_derive;

pub mod activator;
pub mod builder;
pub mod error;
pub mod network;
pub mod node;
pub mod optimizer;
pub mod trainer;

pub use crate::error::{Error, Result};
pub use crate::network::{Network, TrainingExample};
