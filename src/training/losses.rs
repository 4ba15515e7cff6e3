//! Binary cross-entropy losses on discriminator logits.

use ndarray::Array2;

/// Numerically stable mean BCE between logits and 0/1 targets:
/// `max(z, 0) - z*t + ln(1 + exp(-|z|))`.
pub fn bce_with_logits(logits: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    let n = logits.len() as f64;
    logits
        .iter()
        .zip(targets.iter())
        .map(|(&z, &t)| z.max(0.0) - z * t + (-z.abs()).exp().ln_1p())
        .sum::<f64>()
        / n
}

/// Gradient of [`bce_with_logits`] with respect to the logits:
/// `(sigmoid(z) - t) / n`.
pub fn bce_grad(logits: &Array2<f64>, targets: &Array2<f64>) -> Array2<f64> {
    let n = logits.len() as f64;
    let mut grad = logits.mapv(|z| 1.0 / (1.0 + (-z).exp()));
    grad -= targets;
    grad / n
}

/// Generator loss: `-log(D(G(z)))`. The generator wants the
/// discriminator to label its samples real.
pub fn generator_loss(fake_logits: &Array2<f64>) -> f64 {
    let targets = Array2::ones(fake_logits.raw_dim());
    bce_with_logits(fake_logits, &targets)
}
