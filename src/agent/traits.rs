//! Agent trait and the transition unit it learns from.

use ndarray::Array1;

use anyhow::Result;

use crate::environment::TradeAction;

/// One experienced transition.
#[derive(Debug, Clone)]
pub struct Transition {
    pub observation: Array1<f64>,
    pub action: TradeAction,
    pub reward: f64,
    pub next_observation: Array1<f64>,
    pub done: bool,
}

/// Trait for value-based agents.
pub trait Agent {
    /// Select an action for the observation; with probability `epsilon`
    /// the action is random (exploration).
    fn select_action(&mut self, observation: &Array1<f64>, epsilon: f64) -> TradeAction;

    /// Learn from one transition.
    fn learn(&mut self, transition: &Transition);

    /// Current exploration rate.
    fn epsilon(&self) -> f64;

    /// Decay the exploration rate toward its floor.
    fn decay_epsilon(&mut self);

    /// Save the agent to a file.
    fn save(&self, path: &str) -> Result<()>;

    /// Agent name for logs.
    fn name(&self) -> &str;
}
