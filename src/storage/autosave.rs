use std::time::{Duration, Instant};
use tracing::debug;

use super::Storage;
use crate::config::AutoSaveConfig;
use crate::game::Game;

/// Periodic save trigger, driven by the caller's event loop.
#[derive(Debug, Clone)]
pub struct AutoSave {
    enabled: bool,
    interval: Duration,
    last_save: Instant,
}

impl AutoSave {
    pub fn new(config: &AutoSaveConfig, now: Instant) -> Self {
        Self {
            enabled: config.enabled,
            interval: Duration::from_secs(config.interval_secs.max(1)),
            last_save: now,
        }
    }

    /// Saves when the interval has elapsed. A failed save is not retried
    /// early; the next interval simply tries again.
    pub fn tick<S: Storage>(&mut self, now: Instant, game: &mut Game<S>) -> bool {
        if !self.enabled || !game.settings().auto_save {
            return false;
        }
        if now.duration_since(self.last_save) < self.interval {
            return false;
        }
        self.last_save = now;
        let saved = game.save_progress();
        debug!(saved, "auto-save");
        saved
    }
}
