//! Policy training and evaluation loops.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::{Agent, QLearningAgent, QLearningConfig, Transition};
use crate::environment::SeriesEnv;
use crate::error::{PipelineError, Result};

/// Hyperparameters for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Learning rate
    pub learning_rate: f64,
    /// Discount factor
    pub discount: f64,
    /// Total environment steps to train for
    pub training_steps: usize,
    /// Seed for exploration
    pub seed: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount: 0.95,
            training_steps: 2000,
            seed: 0,
        }
    }
}

/// Train a Q-learning agent against the environment.
///
/// Runs whole episodes until the step budget is exhausted, with
/// epsilon-greedy exploration decaying once per episode. Not
/// deterministic across configs: the exploration stream is seeded, but
/// the reward model may carry its own state.
pub fn train_policy(env: &mut SeriesEnv, config: &PolicyConfig) -> Result<QLearningAgent> {
    if config.training_steps == 0 {
        return Err(PipelineError::InvalidConfig(
            "training step budget must be positive".to_string(),
        ));
    }

    let mut agent = QLearningAgent::new(QLearningConfig {
        learning_rate: config.learning_rate,
        discount: config.discount,
        seed: config.seed,
        ..Default::default()
    });

    let mut steps = 0;
    let mut episodes = 0;
    while steps < config.training_steps {
        let mut observation = env.reset();
        loop {
            let epsilon = agent.epsilon();
            let action = agent.select_action(&observation, epsilon);
            let outcome = env.step(action)?;

            agent.learn(&Transition {
                observation,
                action,
                reward: outcome.reward,
                next_observation: outcome.observation.clone(),
                done: outcome.done,
            });

            observation = outcome.observation;
            steps += 1;

            if outcome.done || steps >= config.training_steps {
                break;
            }
        }
        agent.decay_epsilon();
        episodes += 1;
    }

    debug!(
        steps,
        episodes,
        table_size = agent.table_size(),
        "policy training finished"
    );
    Ok(agent)
}

/// Run one full greedy episode and return the cumulative reward.
pub fn evaluate_policy(agent: &QLearningAgent, env: &mut SeriesEnv) -> Result<f64> {
    let mut observation = env.reset();
    let mut total_reward = 0.0;

    loop {
        let action = agent.greedy_action(&observation);
        let outcome = env.step(action)?;
        total_reward += outcome.reward;
        observation = outcome.observation;
        if outcome.done {
            break;
        }
    }

    Ok(total_reward)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Series;
    use crate::environment::{PnlReward, ZeroReward};

    fn rising_series() -> Series {
        Series::from_values((0..60).map(|i| 100.0 + i as f64).collect()).unwrap()
    }

    fn env_with_pnl() -> SeriesEnv {
        SeriesEnv::new(rising_series(), 10, Box::new(PnlReward::new(0.0))).unwrap()
    }

    #[test]
    fn test_train_policy_runs_budget() {
        let mut env = env_with_pnl();
        let agent = train_policy(
            &mut env,
            &PolicyConfig {
                training_steps: 500,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(agent.table_size() > 0);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let mut env = env_with_pnl();
        let err = train_policy(
            &mut env,
            &PolicyConfig {
                training_steps: 0,
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_evaluate_runs_exactly_one_episode() {
        let mut env = env_with_pnl();
        let agent = train_policy(
            &mut env,
            &PolicyConfig {
                training_steps: 200,
                ..Default::default()
            },
        )
        .unwrap();

        let total = evaluate_policy(&agent, &mut env).unwrap();
        assert!(total.is_finite());
        assert!(env.is_done());
    }

    #[test]
    fn test_zero_reward_evaluates_to_zero() {
        let mut train_env = env_with_pnl();
        let agent = train_policy(
            &mut train_env,
            &PolicyConfig {
                training_steps: 100,
                ..Default::default()
            },
        )
        .unwrap();

        let mut env = SeriesEnv::new(rising_series(), 10, Box::new(ZeroReward)).unwrap();
        assert_eq!(evaluate_policy(&agent, &mut env).unwrap(), 0.0);
    }

    #[test]
    fn test_learns_to_buy_in_rising_market() {
        // Monotonically rising prices with no cost: buying dominates.
        let mut env = env_with_pnl();
        let agent = train_policy(
            &mut env,
            &PolicyConfig {
                learning_rate: 0.2,
                discount: 0.9,
                training_steps: 20_000,
                seed: 1,
            },
        )
        .unwrap();

        let total = evaluate_policy(&agent, &mut env).unwrap();
        assert!(total > 0.0, "expected positive return, got {}", total);
    }
}
