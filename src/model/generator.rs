//! Generator network: noise vector to one synthetic scalar.

use ndarray::Array2;
use ndarray_rand::rand_distr::StandardNormal;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::network::{Activation, ForwardCache, LayerGrads, Mlp};

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Size of the latent noise vector
    pub latent_dim: usize,
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            latent_dim: 100,
            hidden_layers: vec![32, 16],
        }
    }
}

/// Maps latent noise vectors to synthetic scalar values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generator {
    network: Mlp,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig, rng: &mut StdRng) -> Self {
        let mut sizes = vec![config.latent_dim];
        sizes.extend(&config.hidden_layers);
        sizes.push(1);

        Self {
            network: Mlp::new(&sizes, Activation::LeakyReLU(0.2), Activation::Linear, rng),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn latent_dim(&self) -> usize {
        self.config.latent_dim
    }

    /// Sample a batch of standard-normal noise vectors.
    pub fn sample_noise(&self, batch_size: usize, rng: &mut StdRng) -> Array2<f64> {
        Array2::from_shape_fn((batch_size, self.config.latent_dim), |_| {
            rng.sample::<f64, _>(StandardNormal)
        })
    }

    /// Forward a noise batch into a column of synthetic values.
    pub fn forward(&self, noise: &Array2<f64>) -> Array2<f64> {
        self.network.forward(noise)
    }

    /// Forward pass keeping intermediates for a training step.
    pub fn forward_cached(&self, noise: &Array2<f64>) -> (Array2<f64>, ForwardCache) {
        self.network.forward_cached(noise)
    }

    /// Back-propagate and return parameter gradients.
    pub fn backward(&self, cache: &ForwardCache, grad_output: &Array2<f64>) -> Vec<LayerGrads> {
        let (grads, _) = self.network.backward(cache, grad_output);
        grads
    }

    /// Gradient-descent step on the generator parameters.
    pub fn apply_gradients(&mut self, grads: &[LayerGrads], learning_rate: f64) {
        self.network.apply_gradients(grads, learning_rate);
    }

    /// Generate `count` independent synthetic scalars.
    ///
    /// Purely functional: same seed, same output.
    pub fn generate(&self, count: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = self.sample_noise(count, &mut rng);
        self.forward(&noise).column(0).to_vec()
    }
}
