use rand::Rng;
use std::time::Duration;

/// Fraction by which each progress step may randomly deviate.
pub const DEFAULT_JITTER: f64 = 0.25;

/// Rival crew racing the player. Progress grows linearly towards 100% over
/// `target_time / speed` seconds, with random jitter on every step.
#[derive(Debug, Clone)]
pub struct Opponent {
    run_secs: f64,
    progress: f64,
    jitter: f64,
    stopped: bool,
}

impl Opponent {
    pub fn new(target_time: u32, speed_multiplier: f64) -> Self {
        let speed = if speed_multiplier.is_finite() {
            speed_multiplier.max(0.1)
        } else {
            1.0
        };
        Self {
            run_secs: (f64::from(target_time) / speed).max(1.0),
            progress: 0.0,
            jitter: DEFAULT_JITTER,
            stopped: false,
        }
    }

    #[cfg(test)]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Percent complete, in `[0, 100]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn has_won(&self) -> bool {
        self.progress >= 100.0
    }

    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Moves the opponent forward by `dt`. Returns `true` on the tick where it
    /// reaches 100%.
    pub fn advance<R: Rng>(&mut self, dt: Duration, rng: &mut R) -> bool {
        if self.stopped || self.has_won() {
            return false;
        }
        let base = dt.as_secs_f64() / self.run_secs * 100.0;
        let noise = if self.jitter > 0.0 {
            rng.gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        self.progress = (self.progress + (base * (1.0 + noise)).max(0.0)).min(100.0);
        self.has_won()
    }
}
