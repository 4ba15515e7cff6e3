//! Small dense network used by both adversarial models.
//!
//! Plain ndarray implementation: batched forward, explicit backward
//! returning parameter gradients and the gradient with respect to the
//! input. The input gradient is what lets the generator update flow
//! through a frozen discriminator.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Activation function types
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Activation {
    ReLU,
    LeakyReLU(f64),
    Tanh,
    Sigmoid,
    Linear,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::ReLU => x.max(0.0),
            Activation::LeakyReLU(alpha) => {
                if x > 0.0 {
                    x
                } else {
                    alpha * x
                }
            }
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Linear => x,
        }
    }

    /// Derivative with respect to the pre-activation `x`.
    fn derivative(&self, x: f64) -> f64 {
        match self {
            Activation::ReLU => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU(alpha) => {
                if x > 0.0 {
                    1.0
                } else {
                    *alpha
                }
            }
            Activation::Tanh => 1.0 - x.tanh().powi(2),
            Activation::Sigmoid => {
                let s = 1.0 / (1.0 + (-x).exp());
                s * (1.0 - s)
            }
            Activation::Linear => 1.0,
        }
    }
}

/// A single dense layer
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Layer {
    weights: Array2<f64>,
    biases: Array1<f64>,
    activation: Activation,
}

impl Layer {
    fn new(input_size: usize, output_size: usize, activation: Activation, rng: &mut StdRng) -> Self {
        // Xavier initialization
        let scale = (2.0 / (input_size + output_size) as f64).sqrt();
        let weights = Array2::random_using((input_size, output_size), Uniform::new(-scale, scale), rng);
        let biases = Array1::zeros(output_size);

        Self {
            weights,
            biases,
            activation,
        }
    }

    /// Pre-activation for a batch: rows are samples.
    fn preactivation(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.biases
    }
}

/// Stored intermediates from a cached forward pass.
pub struct ForwardCache {
    /// Input to each layer.
    inputs: Vec<Array2<f64>>,
    /// Pre-activation of each layer.
    preactivations: Vec<Array2<f64>>,
}

/// Gradients for one layer.
pub struct LayerGrads {
    weights: Array2<f64>,
    biases: Array1<f64>,
}

/// Multi-layer perceptron
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mlp {
    layers: Vec<Layer>,
}

impl Mlp {
    /// Create a network with the given layer sizes. Hidden layers use
    /// `hidden`, the output layer uses `output`.
    pub fn new(
        layer_sizes: &[usize],
        hidden: Activation,
        output: Activation,
        rng: &mut StdRng,
    ) -> Self {
        assert!(layer_sizes.len() >= 2, "need at least input and output layers");

        let mut layers = Vec::new();
        for i in 0..layer_sizes.len() - 1 {
            let activation = if i == layer_sizes.len() - 2 {
                output
            } else {
                hidden
            };
            layers.push(Layer::new(layer_sizes[i], layer_sizes[i + 1], activation, rng));
        }

        Self { layers }
    }

    /// Batched forward pass: rows are samples.
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        let mut output = input.clone();
        for layer in &self.layers {
            let z = layer.preactivation(&output);
            output = z.mapv(|x| layer.activation.apply(x));
        }
        output
    }

    /// Forward pass that keeps the intermediates needed by `backward`.
    pub fn forward_cached(&self, input: &Array2<f64>) -> (Array2<f64>, ForwardCache) {
        let mut inputs = Vec::with_capacity(self.layers.len());
        let mut preactivations = Vec::with_capacity(self.layers.len());

        let mut output = input.clone();
        for layer in &self.layers {
            inputs.push(output.clone());
            let z = layer.preactivation(&output);
            output = z.mapv(|x| layer.activation.apply(x));
            preactivations.push(z);
        }

        (
            output,
            ForwardCache {
                inputs,
                preactivations,
            },
        )
    }

    /// Back-propagate `grad_output` (dLoss/dOutput for the batch)
    /// through the cached pass. Returns per-layer parameter gradients
    /// and the gradient with respect to the network input.
    pub fn backward(
        &self,
        cache: &ForwardCache,
        grad_output: &Array2<f64>,
    ) -> (Vec<LayerGrads>, Array2<f64>) {
        let mut grads = vec![];
        let mut grad = grad_output.clone();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let activation_grad = cache.preactivations[i].mapv(|z| layer.activation.derivative(z));
            let delta = &grad * &activation_grad;

            grads.push(LayerGrads {
                weights: cache.inputs[i].t().dot(&delta),
                biases: delta.sum_axis(Axis(0)),
            });
            grad = delta.dot(&layer.weights.t());
        }

        grads.reverse();
        (grads, grad)
    }

    /// Gradient-descent step.
    pub fn apply_gradients(&mut self, grads: &[LayerGrads], learning_rate: f64) {
        for (layer, grad) in self.layers.iter_mut().zip(grads) {
            layer.weights.scaled_add(-learning_rate, &grad.weights);
            layer.biases.scaled_add(-learning_rate, &grad.biases);
        }
    }

    /// Input dimensionality.
    pub fn input_size(&self) -> usize {
        self.layers[0].weights.nrows()
    }

    /// Output dimensionality.
    pub fn output_size(&self) -> usize {
        self.layers.last().unwrap().weights.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_network_shapes() {
        let network = Mlp::new(&[10, 32, 1], Activation::ReLU, Activation::Linear, &mut rng());
        assert_eq!(network.input_size(), 10);
        assert_eq!(network.output_size(), 1);

        let input = Array2::zeros((4, 10));
        let output = network.forward(&input);
        assert_eq!(output.dim(), (4, 1));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = Mlp::new(&[5, 8, 1], Activation::Tanh, Activation::Linear, &mut rng());
        let b = Mlp::new(&[5, 8, 1], Activation::Tanh, Activation::Linear, &mut rng());

        let input = Array2::from_elem((2, 5), 0.3);
        assert_eq!(a.forward(&input), b.forward(&input));
    }

    #[test]
    fn test_gradient_step_reduces_squared_error() {
        let mut network = Mlp::new(&[3, 16, 1], Activation::Tanh, Activation::Linear, &mut rng());
        let input = Array2::from_shape_vec((4, 3), vec![0.1; 12]).unwrap();
        let target = 0.5;

        let mut losses = Vec::new();
        for _ in 0..50 {
            let (output, cache) = network.forward_cached(&input);
            let loss = output.mapv(|o| (o - target).powi(2)).mean().unwrap();
            losses.push(loss);

            let n = output.nrows() as f64;
            let grad_output = output.mapv(|o| 2.0 * (o - target) / n);
            let (grads, _) = network.backward(&cache, &grad_output);
            network.apply_gradients(&grads, 0.1);
        }

        assert!(losses.last().unwrap() < &losses[0]);
    }

    #[test]
    fn test_input_gradient_matches_finite_difference() {
        let network = Mlp::new(&[2, 6, 1], Activation::Tanh, Activation::Linear, &mut rng());
        let input = Array2::from_shape_vec((1, 2), vec![0.3, -0.2]).unwrap();

        let (output, cache) = network.forward_cached(&input);
        let grad_output = Array2::ones((1, 1));
        let (_, grad_input) = network.backward(&cache, &grad_output);

        let eps = 1e-6;
        for j in 0..2 {
            let mut bumped = input.clone();
            bumped[[0, j]] += eps;
            let numeric = (network.forward(&bumped)[[0, 0]] - output[[0, 0]]) / eps;
            assert!((numeric - grad_input[[0, j]]).abs() < 1e-4);
        }
    }
}
