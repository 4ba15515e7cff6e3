//! Simulation environment with a gym-like interface.

mod action;
mod reward;
mod series_env;

pub use action::TradeAction;
pub use reward::{PnlReward, RewardModel, ZeroReward};
pub use series_env::{SeriesEnv, StepInfo, StepOutcome, DEFAULT_WINDOW};
