//! Adversarial model architecture (Generator and Discriminator).

mod discriminator;
mod gan;
mod generator;
pub mod network;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use gan::Gan;
pub use generator::{Generator, GeneratorConfig};
