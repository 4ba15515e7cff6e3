//! Adversarial training loop and loss functions.

pub mod losses;
mod metrics;
mod trainer;

pub use metrics::TrainingMetrics;
pub use trainer::{evaluate_generator, GanTrainer, TrainingConfig};
