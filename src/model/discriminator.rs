//! Discriminator network: one scalar to a realness probability.

use ndarray::Array2;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::network::{Activation, ForwardCache, LayerGrads, Mlp};

/// Discriminator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscriminatorConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![32, 16],
        }
    }
}

/// Scores one scalar value with the probability that it is real.
///
/// The network outputs raw logits; [`Discriminator::classify`] applies
/// the sigmoid. Losses work on logits for numerical stability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discriminator {
    network: Mlp,
    config: DiscriminatorConfig,
}

impl Discriminator {
    pub fn new(config: DiscriminatorConfig, rng: &mut StdRng) -> Self {
        let mut sizes = vec![1];
        sizes.extend(&config.hidden_layers);
        sizes.push(1);

        Self {
            network: Mlp::new(&sizes, Activation::LeakyReLU(0.2), Activation::Linear, rng),
            config,
        }
    }

    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }

    /// Raw logits for a column of samples.
    pub fn forward(&self, samples: &Array2<f64>) -> Array2<f64> {
        self.network.forward(samples)
    }

    /// Forward pass keeping intermediates for a training step.
    pub fn forward_cached(&self, samples: &Array2<f64>) -> (Array2<f64>, ForwardCache) {
        self.network.forward_cached(samples)
    }

    /// Probability in [0, 1] that each sample is real.
    pub fn classify(&self, samples: &Array2<f64>) -> Array2<f64> {
        self.forward(samples).mapv(sigmoid)
    }

    /// Back-propagate, returning parameter gradients and the gradient
    /// with respect to the input samples. The input gradient is what a
    /// generator update consumes while the discriminator stays frozen.
    pub fn backward(
        &self,
        cache: &ForwardCache,
        grad_output: &Array2<f64>,
    ) -> (Vec<LayerGrads>, Array2<f64>) {
        self.network.backward(cache, grad_output)
    }

    /// Gradient-descent step on the discriminator parameters.
    pub fn apply_gradients(&mut self, grads: &[LayerGrads], learning_rate: f64) {
        self.network.apply_gradients(grads, learning_rate);
    }

    /// Fraction of `samples` classified with the expected label.
    ///
    /// `real` selects whether the expected probability is above or
    /// below 0.5.
    pub fn accuracy(&self, samples: &Array2<f64>, real: bool) -> f64 {
        let probs = self.classify(samples);
        let hits = probs
            .iter()
            .filter(|&&p| if real { p >= 0.5 } else { p < 0.5 })
            .count();
        hits as f64 / probs.len() as f64
    }
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
