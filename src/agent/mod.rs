//! Value-based agents and the policy train/evaluate loops.

mod policy;
mod q_learning;
mod traits;

pub use policy::{evaluate_policy, train_policy, PolicyConfig};
pub use q_learning::{Discretizer, QLearningAgent, QLearningConfig};
pub use traits::{Agent, Transition};
