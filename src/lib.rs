//! # Rust Trading Pipeline
//!
//! Research pipeline over a noisy scalar time series: a recursive
//! Kalman filter denoises it, an adversarial pair learns to generate
//! statistically similar synthetic series, and a finite-horizon
//! decision environment built on the smoothed series trains a
//! value-based policy whose hyperparameters are tuned by sequential
//! model-based search.
//!
//! ## Modules
//!
//! - `data` - Series type and retrieval capability
//! - `filter` - Kalman smoother
//! - `model` - Generator, Discriminator, and the adversarial pair
//! - `training` - Adversarial training loop
//! - `environment` - Episodic decision process over a series
//! - `agent` - Q-learning agent and policy train/evaluate loops
//! - `search` - Hyperparameter maximization
//! - `pipeline` - Configuration object and end-to-end orchestration

pub mod agent;
pub mod data;
pub mod environment;
pub mod error;
pub mod filter;
pub mod model;
pub mod pipeline;
pub mod search;
pub mod training;

pub use agent::{evaluate_policy, train_policy, Agent, PolicyConfig, QLearningAgent};
pub use data::{CsvSource, InMemorySource, Series, SeriesSource};
pub use environment::{PnlReward, RewardModel, SeriesEnv, TradeAction, ZeroReward};
pub use error::PipelineError;
pub use filter::{smooth, KalmanConfig, KalmanFilter};
pub use model::{Discriminator, Gan, Generator};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineOutput};
pub use search::{SearchConfig, SearchSpace, Trial};
pub use training::{GanTrainer, TrainingConfig, TrainingMetrics};
