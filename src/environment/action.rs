//! Discrete action space.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// The three trading actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeAction {
    Sell,
    Buy,
    Hold,
}

impl TradeAction {
    /// Number of actions.
    pub fn count() -> usize {
        3
    }

    /// All actions in index order.
    pub fn all() -> [TradeAction; 3] {
        [TradeAction::Sell, TradeAction::Buy, TradeAction::Hold]
    }

    /// Decode an action index; out-of-range indices are rejected.
    pub fn from_index(index: usize) -> Result<Self> {
        match index {
            0 => Ok(TradeAction::Sell),
            1 => Ok(TradeAction::Buy),
            2 => Ok(TradeAction::Hold),
            _ => Err(PipelineError::InvalidAction {
                index,
                count: Self::count(),
            }),
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            TradeAction::Sell => 0,
            TradeAction::Buy => 1,
            TradeAction::Hold => 2,
        }
    }

    /// Signed position the action takes: -1, 1, or 0.
    pub fn position(self) -> f64 {
        match self {
            TradeAction::Sell => -1.0,
            TradeAction::Buy => 1.0,
            TradeAction::Hold => 0.0,
        }
    }
}
