//! Finite-horizon decision process over a price series.

use ndarray::Array1;

use crate::data::Series;
use crate::environment::{RewardModel, TradeAction, ZeroReward};
use crate::error::{PipelineError, Result};

/// Default observation window length.
pub const DEFAULT_WINDOW: usize = 10;

/// Step result returned by the environment
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Next observation window
    pub observation: Array1<f64>,
    /// Reward for the action
    pub reward: f64,
    /// Whether the episode terminated on this step
    pub done: bool,
    /// Additional info
    pub info: StepInfo,
}

/// Additional information about the step
#[derive(Debug, Clone)]
pub struct StepInfo {
    /// Step index after the transition
    pub step: usize,
    /// Last price visible in the new observation window
    pub price: f64,
}

/// Episodic environment over an immutable source series.
///
/// The state is the step index `t`; the observation is the window of
/// `window` consecutive values starting at `t`. The episode is terminal
/// once `t >= len - window`.
pub struct SeriesEnv {
    series: Series,
    window: usize,
    current_step: usize,
    done: bool,
    reward_model: Box<dyn RewardModel>,
}

impl std::fmt::Debug for SeriesEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The reward model is a trait object; report everything else.
        f.debug_struct("SeriesEnv")
            .field("series_len", &self.series.len())
            .field("window", &self.window)
            .field("current_step", &self.current_step)
            .field("done", &self.done)
            .finish()
    }
}

impl SeriesEnv {
    /// Create an environment with an injected reward model.
    ///
    /// The series must admit at least one full window plus one step.
    pub fn new(series: Series, window: usize, reward_model: Box<dyn RewardModel>) -> Result<Self> {
        if window == 0 {
            return Err(PipelineError::InvalidConfig(
                "window length must be positive".to_string(),
            ));
        }
        if series.len() < window + 1 {
            return Err(PipelineError::InvalidInput(format!(
                "series length {} admits no episode with window {}",
                series.len(),
                window
            )));
        }

        Ok(Self {
            series,
            window,
            current_step: 0,
            done: false,
            reward_model,
        })
    }

    /// Create with the default window and the zero reward model.
    pub fn with_defaults(series: Series) -> Result<Self> {
        Self::new(series, DEFAULT_WINDOW, Box::new(ZeroReward))
    }

    /// Observation space shape: the window length.
    pub fn observation_size(&self) -> usize {
        self.window
    }

    /// Action space size.
    pub fn action_size(&self) -> usize {
        TradeAction::count()
    }

    /// Current step index.
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Whether the current episode has terminated.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of steps a full episode takes.
    pub fn horizon(&self) -> usize {
        self.series.len() - self.window
    }

    /// Start a new episode and return the initial observation.
    pub fn reset(&mut self) -> Array1<f64> {
        self.current_step = 0;
        self.done = false;
        self.reward_model.reset();
        self.observation()
    }

    /// Advance one step with the given action.
    ///
    /// Stepping a terminated episode is an error, never stale data.
    pub fn step(&mut self, action: TradeAction) -> Result<StepOutcome> {
        if self.done {
            return Err(PipelineError::EpisodeExhausted {
                step: self.current_step,
            });
        }

        let window = self
            .series
            .window(self.current_step, self.window)
            .expect("episode invariant: window fits while not done");
        let next_price = self.series.values()[self.current_step + self.window];
        let reward = self.reward_model.reward(window, next_price, action);

        self.current_step += 1;
        self.done = self.current_step >= self.series.len() - self.window;

        let observation = self.observation();
        let price = observation[observation.len() - 1];

        Ok(StepOutcome {
            observation,
            reward,
            done: self.done,
            info: StepInfo {
                step: self.current_step,
                price,
            },
        })
    }

    fn observation(&self) -> Array1<f64> {
        let window = self
            .series
            .window(self.current_step, self.window)
            .expect("episode invariant: window fits at current step");
        Array1::from_vec(window.to_vec())
    }
}
