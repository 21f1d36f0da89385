/// Learning rate that can be annealed during best-of-N training.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRate {
    initial: f64,
    rate: f64
}

impl LearningRate {
    /// Starting point for the learning rate.
    pub fn new(rate: f64) -> Self { Self { initial: rate, rate } }

    /// Return the current learning rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The rate training started with.
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// Decay is allowed while rate * fraction still exceeds the initial rate.
    /// Compared against the initial rate, not the current one, so a fraction of 2^k allows k halvings.
    pub fn can_decay(&self, fraction: f64) -> bool {
        fraction > 0. && self.rate * fraction > self.initial
    }

    pub fn halve(&mut self) {
        self.rate /= 2.;
    }
}
