//! Adversarial pair combining Generator and Discriminator.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{Generator, GeneratorConfig};

/// The adversarial pair. The trainer owns it for the duration of
/// training; afterwards the generator is extracted and frozen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gan {
    pub generator: Generator,
    pub discriminator: Discriminator,
}

impl Gan {
    /// Create both models with seeded weight initialization.
    pub fn new(gen_config: GeneratorConfig, disc_config: DiscriminatorConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let generator = Generator::new(gen_config, &mut rng);
        let discriminator = Discriminator::new(disc_config, &mut rng);

        Self {
            generator,
            discriminator,
        }
    }

    /// Create with default model configurations and the given latent size.
    pub fn with_latent_dim(latent_dim: usize, seed: u64) -> Self {
        let gen_config = GeneratorConfig {
            latent_dim,
            ..Default::default()
        };
        Self::new(gen_config, DiscriminatorConfig::default(), seed)
    }

    pub fn latent_dim(&self) -> usize {
        self.generator.latent_dim()
    }

    /// Consume the pair, returning the trained generator.
    pub fn into_generator(self) -> Generator {
        self.generator
    }
}
