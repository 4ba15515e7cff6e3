//! Pluggable reward computation.
//!
//! The decision process itself does not fix a reward formula; it only
//! guarantees a well-typed scalar. Concrete models are injected at
//! environment construction.

use crate::environment::TradeAction;

/// Reward strategy evaluated on each step.
///
/// `window` is the observation window at the pre-step index and
/// `next_price` the first price that becomes visible after stepping.
pub trait RewardModel {
    fn reward(&mut self, window: &[f64], next_price: f64, action: TradeAction) -> f64;

    /// Reset any per-episode state.
    fn reset(&mut self) {}
}

/// Always returns zero. The default: without a market-impact model the
/// decision process carries no learning signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroReward;

impl RewardModel for ZeroReward {
    fn reward(&mut self, _window: &[f64], _next_price: f64, _action: TradeAction) -> f64 {
        0.0
    }
}

/// Transaction-cost-aware mark-to-market reward.
///
/// The action's position is held over the step: reward is position
/// times the step return, minus a cost in basis points whenever the
/// position changes.
#[derive(Debug, Clone)]
pub struct PnlReward {
    /// Cost charged on a position change, in fractional terms.
    pub trading_cost_bps: f64,
    position: f64,
}

impl PnlReward {
    pub fn new(trading_cost_bps: f64) -> Self {
        Self {
            trading_cost_bps,
            position: 0.0,
        }
    }
}

impl Default for PnlReward {
    fn default() -> Self {
        Self::new(0.001)
    }
}

impl RewardModel for PnlReward {
    fn reward(&mut self, window: &[f64], next_price: f64, action: TradeAction) -> f64 {
        let last_price = *window.last().expect("window is never empty");
        let step_return = if last_price != 0.0 {
            (next_price - last_price) / last_price
        } else {
            0.0
        };

        let new_position = action.position();
        let cost = (new_position - self.position).abs() * self.trading_cost_bps;
        self.position = new_position;

        new_position * step_return - cost
    }

    fn reset(&mut self) {
        self.position = 0.0;
    }
}
