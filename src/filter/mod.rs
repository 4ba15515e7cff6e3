//! Recursive Kalman smoother for scalar series.
//!
//! Maintains a running (mean, variance) estimate of the hidden true
//! value under identity dynamics. Strictly causal: the estimate at
//! index `i` depends only on observations up to and including `i`.

use serde::{Deserialize, Serialize};

use crate::data::Series;
use crate::error::{PipelineError, Result};

/// Kalman filter parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// Process noise Q. Higher Q trusts observations more (reactive).
    pub process_noise: f64,
    /// Observation noise R. Higher R trusts the model more (smooth).
    pub observation_noise: f64,
    /// Prior mean before the first observation.
    pub initial_mean: f64,
    /// Prior variance. Large values make the first observation dominate.
    pub initial_variance: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 1e-5,
            observation_noise: 1e-2,
            initial_mean: 0.0,
            initial_variance: 1e6,
        }
    }
}

/// Scalar Kalman filter state for a single smoothing pass.
///
/// Owned by the pass and discarded afterwards; use [`smooth`] for the
/// whole-series contract.
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    mean: f64,
    variance: f64,
    process_noise: f64,
    observation_noise: f64,
}

impl KalmanFilter {
    pub fn new(config: &KalmanConfig) -> Self {
        Self {
            mean: config.initial_mean,
            variance: config.initial_variance,
            process_noise: config.process_noise,
            observation_noise: config.observation_noise,
        }
    }

    /// Fold in one observation and return the posterior mean.
    pub fn update(&mut self, observation: f64) -> f64 {
        // Predict under identity dynamics.
        let predicted_mean = self.mean;
        let predicted_variance = self.variance + self.process_noise;

        // Correct: blend prediction and observation by the Kalman gain.
        let gain = predicted_variance / (predicted_variance + self.observation_noise);
        self.mean = predicted_mean + gain * (observation - predicted_mean);
        self.variance = (1.0 - gain) * predicted_variance;

        self.mean
    }

    /// Current posterior mean.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Current posterior variance.
    pub fn variance(&self) -> f64 {
        self.variance
    }
}

/// Smooth a series, returning a new series with the same timestamps
/// whose values are the filter's posterior means.
///
/// Fails with `InvalidInput` on an empty series or a non-finite
/// observation. Deterministic for fixed parameters.
pub fn smooth(series: &Series, config: &KalmanConfig) -> Result<Series> {
    if series.is_empty() {
        return Err(PipelineError::InvalidInput(
            "cannot smooth an empty series".to_string(),
        ));
    }

    let mut filter = KalmanFilter::new(config);
    let mut smoothed = Vec::with_capacity(series.len());
    for (i, &observation) in series.values().iter().enumerate() {
        if !observation.is_finite() {
            return Err(PipelineError::InvalidInput(format!(
                "non-finite observation {} at index {}",
                observation, i
            )));
        }
        smoothed.push(filter.update(observation));
    }

    series.with_values(smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_constant() {
        let series = Series::from_values(vec![5.0; 50]).unwrap();
        let smoothed = smooth(&series, &KalmanConfig::default()).unwrap();

        // With a large prior variance the first estimate already jumps
        // close to the signal, and later ones converge tightly.
        let last = *smoothed.values().last().unwrap();
        assert!((last - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_converges_for_any_positive_prior_variance() {
        for &variance in &[0.1, 1.0, 100.0, 1e6] {
            let config = KalmanConfig {
                initial_variance: variance,
                ..Default::default()
            };
            let series = Series::from_values(vec![3.0; 200]).unwrap();
            let smoothed = smooth(&series, &config).unwrap();
            let last = *smoothed.values().last().unwrap();
            assert!((last - 3.0).abs() < 1e-2, "variance {}", variance);
        }
    }

    #[test]
    fn test_empty_series_fails() {
        let series = Series::from_values(vec![]).unwrap();
        let err = smooth(&series, &KalmanConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_preserves_length_and_timestamps() {
        let series = Series::from_values(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let smoothed = smooth(&series, &KalmanConfig::default()).unwrap();
        assert_eq!(smoothed.len(), series.len());
        assert_eq!(smoothed.timestamps(), series.timestamps());
    }

    #[test]
    fn test_causal() {
        // Changing a later observation must not change earlier estimates.
        let base = Series::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let altered = Series::from_values(vec![1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();

        let config = KalmanConfig::default();
        let a = smooth(&base, &config).unwrap();
        let b = smooth(&altered, &config).unwrap();
        assert_eq!(a.values()[..4], b.values()[..4]);
    }
}
