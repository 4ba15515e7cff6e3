//! Black-box hyperparameter maximization.
//!
//! Sequential model-based search over a bounded (learning rate,
//! discount factor) rectangle: a handful of random probes seed a
//! Gaussian-process surrogate, then each refinement iteration proposes
//! the candidate with the best expected improvement. Trials share only
//! the search history; the iteration budget is the sole termination
//! mechanism.

mod surrogate;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use surrogate::GaussianProcess;

/// Bounded search rectangle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    /// Learning rate bounds, searched in log space
    pub learning_rate: (f64, f64),
    /// Discount factor bounds
    pub discount: (f64, f64),
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            learning_rate: (1e-5, 1e-2),
            discount: (0.8, 0.99),
        }
    }
}

impl SearchSpace {
    fn validate(&self) -> Result<()> {
        let (lr_lo, lr_hi) = self.learning_rate;
        let (d_lo, d_hi) = self.discount;
        if !(lr_lo > 0.0 && lr_lo < lr_hi) {
            return Err(PipelineError::InvalidConfig(format!(
                "bad learning rate bounds ({}, {})",
                lr_lo, lr_hi
            )));
        }
        if !(d_lo < d_hi) {
            return Err(PipelineError::InvalidConfig(format!(
                "bad discount bounds ({}, {})",
                d_lo, d_hi
            )));
        }
        Ok(())
    }

    /// Map unit-square coordinates to a parameter pair. The learning
    /// rate axis is logarithmic.
    fn denormalize(&self, u: [f64; 2]) -> (f64, f64) {
        let (lr_lo, lr_hi) = self.learning_rate;
        let lr = (lr_lo.ln() + u[0] * (lr_hi.ln() - lr_lo.ln())).exp();
        let (d_lo, d_hi) = self.discount;
        let discount = d_lo + u[1] * (d_hi - d_lo);
        (lr, discount)
    }
}

/// One evaluated hyperparameter candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    pub learning_rate: f64,
    pub discount: f64,
    pub score: f64,
}

/// Search budget and sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Random probes before the surrogate takes over
    pub init_probes: usize,
    /// Sequential refinement iterations
    pub iterations: usize,
    /// Candidate pool size for acquisition maximization
    pub candidate_pool: usize,
    /// Seed for probe and candidate sampling
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            init_probes: 5,
            iterations: 15,
            candidate_pool: 256,
            seed: 0,
        }
    }
}

/// Search result: the best trial plus the full history.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: Trial,
    pub trials: Vec<Trial>,
}

/// Maximize a black-box objective over the search space.
///
/// The objective is called once per trial with (learning rate,
/// discount); its failures propagate immediately.
pub fn maximize<F>(space: &SearchSpace, config: &SearchConfig, mut objective: F) -> Result<SearchOutcome>
where
    F: FnMut(f64, f64) -> Result<f64>,
{
    space.validate()?;
    if config.init_probes == 0 {
        return Err(PipelineError::InvalidConfig(
            "at least one initial probe is required".to_string(),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut points: Vec<[f64; 2]> = Vec::new();
    let mut trials: Vec<Trial> = Vec::new();

    let evaluate = |u: [f64; 2],
                        points: &mut Vec<[f64; 2]>,
                        trials: &mut Vec<Trial>,
                        objective: &mut F|
     -> Result<()> {
        let (learning_rate, discount) = space.denormalize(u);
        let score = objective(learning_rate, discount)?;
        debug!(learning_rate, discount, score, "trial evaluated");
        points.push(u);
        trials.push(Trial {
            learning_rate,
            discount,
            score,
        });
        Ok(())
    };

    // Initial random probes.
    for _ in 0..config.init_probes {
        let u = [rng.gen::<f64>(), rng.gen::<f64>()];
        evaluate(u, &mut points, &mut trials, &mut objective)?;
    }

    // Sequential refinement: fit the surrogate to the history, then
    // evaluate the candidate with the best expected improvement.
    let standard_normal = Normal::new(0.0, 1.0).expect("standard normal parameters are valid");
    for _ in 0..config.iterations {
        let scores: Vec<f64> = trials.iter().map(|t| t.score).collect();
        let candidate = match GaussianProcess::fit(&points, &scores) {
            Some(gp) => {
                let best_raw = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let best_score = gp.standardize(best_raw);
                let mut best_u = [rng.gen::<f64>(), rng.gen::<f64>()];
                let mut best_ei = f64::NEG_INFINITY;
                for _ in 0..config.candidate_pool {
                    let u = [rng.gen::<f64>(), rng.gen::<f64>()];
                    let (mean, std) = gp.predict(u);
                    let ei = expected_improvement(mean, std, best_score, &standard_normal);
                    if ei > best_ei {
                        best_ei = ei;
                        best_u = u;
                    }
                }
                best_u
            }
            // Degenerate history (constant scores); fall back to random.
            None => [rng.gen::<f64>(), rng.gen::<f64>()],
        };
        evaluate(candidate, &mut points, &mut trials, &mut objective)?;
    }

    let best = trials
        .iter()
        .max_by(|a, b| a.score.partial_cmp(&b.score).expect("scores are finite"))
        .cloned()
        .expect("at least one probe was evaluated");

    info!(
        learning_rate = best.learning_rate,
        discount = best.discount,
        score = best.score,
        trials = trials.len(),
        "search finished"
    );

    Ok(SearchOutcome { best, trials })
}

/// EI with a small exploration margin.
fn expected_improvement(mean: f64, std: f64, best: f64, normal: &Normal) -> f64 {
    const XI: f64 = 0.01;
    if std < 1e-12 {
        return 0.0;
    }
    let improvement = mean - best - XI;
    let z = improvement / std;
    improvement * normal.cdf(z) + std * normal.pdf(z)
}
