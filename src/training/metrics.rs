//! Training metrics for monitoring GAN progress.

/// Loss and accuracy history recorded at the reporting cadence.
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Generator losses per report
    pub gen_losses: Vec<f64>,
    /// Discriminator losses per report
    pub disc_losses: Vec<f64>,
    /// Discriminator accuracy on real samples
    pub disc_real_acc: Vec<f64>,
    /// Discriminator accuracy on fake samples
    pub disc_fake_acc: Vec<f64>,
}

impl TrainingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one report point.
    pub fn record(&mut self, gen_loss: f64, disc_loss: f64, real_acc: f64, fake_acc: f64) {
        self.gen_losses.push(gen_loss);
        self.disc_losses.push(disc_loss);
        self.disc_real_acc.push(real_acc);
        self.disc_fake_acc.push(fake_acc);
    }

    /// Number of recorded report points.
    pub fn num_reports(&self) -> usize {
        self.gen_losses.len()
    }

    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.gen_losses.last().copied()
    }

    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Moving average of generator loss over the last `window` reports.
    pub fn gen_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.gen_losses, window)
    }

    /// Moving average of discriminator loss over the last `window` reports.
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.disc_losses, window)
    }

    /// Heuristic mode-collapse check: the discriminator wins outright
    /// (very low loss) while the generator loss blows up.
    pub fn check_mode_collapse(&self, window: usize) -> bool {
        if self.num_reports() < window {
            return false;
        }
        self.disc_loss_ma(window) < 0.1 && self.gen_loss_ma(window) > 5.0
    }

    /// Balanced training keeps discriminator accuracy away from both
    /// extremes on real and fake samples.
    pub fn is_balanced(&self, window: usize) -> bool {
        if self.num_reports() < window {
            return true;
        }

        let avg_real = moving_average(&self.disc_real_acc, window);
        let avg_fake = moving_average(&self.disc_fake_acc, window);
        (0.3..0.9).contains(&avg_real) && (0.3..0.9).contains(&avg_fake)
    }
}

fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let tail: Vec<f64> = values.iter().rev().take(window).copied().collect();
    tail.iter().sum::<f64>() / tail.len() as f64
}
