//! Tabular Q-learning over discretized observation windows.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Transition};
use crate::environment::TradeAction;

/// Discretization of continuous observations into bin keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discretizer {
    num_bins: usize,
}

impl Discretizer {
    pub fn new(num_bins: usize) -> Self {
        Self { num_bins }
    }

    /// Normalize a window to [-1, 1] by its own range, then bin each
    /// value. A constant window maps to the middle bin everywhere, so
    /// the key captures shape rather than level.
    pub fn discretize(&self, observation: &Array1<f64>) -> Vec<usize> {
        let min = observation.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = observation.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        observation
            .iter()
            .map(|&v| {
                let normalized = if range > 0.0 {
                    (v - min) / range
                } else {
                    0.5
                };
                let bin = (normalized * self.num_bins as f64).floor() as usize;
                bin.min(self.num_bins - 1)
            })
            .collect()
    }
}

/// Q-learning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Learning rate (alpha)
    pub learning_rate: f64,
    /// Discount factor (gamma)
    pub discount: f64,
    /// Initial exploration rate
    pub epsilon_start: f64,
    /// Exploration floor
    pub epsilon_end: f64,
    /// Multiplicative epsilon decay per episode
    pub epsilon_decay: f64,
    /// Bins per observation component
    pub num_bins: usize,
    /// Seed for exploration
    pub seed: u64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            epsilon_start: 1.0,
            epsilon_end: 0.01,
            epsilon_decay: 0.995,
            num_bins: 10,
            seed: 0,
        }
    }
}

/// Tabular Q-learning agent.
#[derive(Debug, Serialize, Deserialize)]
pub struct QLearningAgent {
    /// JSON maps need string keys, so the table round-trips as a list
    /// of entries.
    #[serde(with = "table_entries")]
    q_table: HashMap<(Vec<usize>, usize), f64>,
    discretizer: Discretizer,
    config: QLearningConfig,
    epsilon: f64,
    #[serde(skip, default = "default_rng")]
    rng: StdRng,
}

fn default_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

mod table_entries {
    use std::collections::HashMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    type Table = HashMap<(Vec<usize>, usize), f64>;

    pub fn serialize<S: Serializer>(table: &Table, serializer: S) -> Result<S::Ok, S::Error> {
        let entries: Vec<(&(Vec<usize>, usize), &f64)> = table.iter().collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Table, D::Error> {
        let entries: Vec<((Vec<usize>, usize), f64)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

impl QLearningAgent {
    pub fn new(config: QLearningConfig) -> Self {
        Self {
            q_table: HashMap::new(),
            discretizer: Discretizer::new(config.num_bins),
            epsilon: config.epsilon_start,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    fn q_value(&self, state: &[usize], action: usize) -> f64 {
        self.q_table
            .get(&(state.to_vec(), action))
            .copied()
            .unwrap_or(0.0)
    }

    fn best_action_index(&self, state: &[usize]) -> usize {
        (0..TradeAction::count())
            .max_by(|&a, &b| {
                self.q_value(state, a)
                    .partial_cmp(&self.q_value(state, b))
                    .expect("q-values are finite")
            })
            .unwrap_or(TradeAction::Hold.to_index())
    }

    /// Greedy action for an observation, no exploration.
    pub fn greedy_action(&self, observation: &Array1<f64>) -> TradeAction {
        let state = self.discretizer.discretize(observation);
        TradeAction::from_index(self.best_action_index(&state))
            .expect("best action index is always in range")
    }

    /// Number of visited state-action pairs.
    pub fn table_size(&self) -> usize {
        self.q_table.len()
    }

    /// Load an agent from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let mut agent: QLearningAgent = serde_json::from_reader(reader)?;
        agent.rng = StdRng::seed_from_u64(agent.config.seed);
        Ok(agent)
    }
}

impl Agent for QLearningAgent {
    fn select_action(&mut self, observation: &Array1<f64>, epsilon: f64) -> TradeAction {
        if self.rng.gen::<f64>() < epsilon {
            let index = self.rng.gen_range(0..TradeAction::count());
            TradeAction::from_index(index).expect("sampled index is in range")
        } else {
            self.greedy_action(observation)
        }
    }

    fn learn(&mut self, transition: &Transition) {
        let state = self.discretizer.discretize(&transition.observation);
        let next_state = self.discretizer.discretize(&transition.next_observation);
        let action = transition.action.to_index();

        let current = self.q_value(&state, action);
        let target = if transition.done {
            transition.reward
        } else {
            let best_next = self.best_action_index(&next_state);
            transition.reward + self.config.discount * self.q_value(&next_state, best_next)
        };

        let updated = current + self.config.learning_rate * (target - current);
        self.q_table.insert((state, action), updated);
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_end);
    }

    fn save(&self, path: &str) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "Q-Learning"
    }
}
