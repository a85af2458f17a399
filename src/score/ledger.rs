use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::rank::Rank;
use crate::config::ScoringConfig;
use crate::mission::Mission;

pub const MIN_MULTIPLIER: f64 = 0.1;
pub const MAX_MULTIPLIER: f64 = 10.0;
const PERFECT_XP_FACTOR: f64 = 1.5;

/// Telemetry the puzzle layer reports when a mission ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionStats {
    pub attempts: u32,
    pub hints_used: u32,
    /// Seconds spent on the attempt.
    pub time: u64,
    /// Par time in seconds; finishing under it earns a time bonus.
    pub target_time: u32,
}

/// Scoring accumulator for one mission attempt.
///
/// `reset` starts an attempt, the `record_*` and `*_points` calls mutate it
/// while the puzzle runs, and `calculate_final_score` reads it once at the
/// end. The running score is clamped to `[min_score, max_score]` after every
/// mutation.
#[derive(Debug, Clone)]
pub struct ScoreLedger {
    config: ScoringConfig,
    current_score: f64,
    attempts: u32,
    hints_used: u32,
    multiplier: f64,
    started_at: Option<DateTime<Utc>>,
}

impl ScoreLedger {
    pub fn new(config: ScoringConfig) -> Self {
        let mut ledger = Self {
            current_score: config.base_score,
            attempts: 0,
            hints_used: 0,
            multiplier: 1.0,
            started_at: None,
            config,
        };
        ledger.current_score = ledger.clamp(ledger.current_score);
        ledger
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.reset_at(Utc::now());
    }

    /// Resets the ledger as if the attempt began at `started_at`.
    pub fn reset_at(&mut self, started_at: DateTime<Utc>) {
        self.current_score = self.clamp(self.config.base_score);
        self.attempts = 0;
        self.hints_used = 0;
        self.multiplier = 1.0;
        self.started_at = Some(started_at);
        debug!(score = self.current_score, "score ledger reset");
    }

    /// Adds a bonus scaled by the current multiplier.
    pub fn add_points(&mut self, points: f64) {
        if !points.is_finite() {
            warn!(points, "ignoring non-finite score bonus");
            return;
        }
        self.current_score = self.clamp(self.current_score + points * self.multiplier);
        debug!(points, score = self.current_score, "points added");
    }

    /// Applies a penalty. Penalties are never scaled by the multiplier.
    pub fn subtract_points(&mut self, points: f64) {
        if !points.is_finite() {
            warn!(points, "ignoring non-finite score penalty");
            return;
        }
        self.current_score = self.clamp(self.current_score - points);
        debug!(points, score = self.current_score, "points subtracted");
    }

    pub fn record_attempt(&mut self) {
        self.attempts += 1;
        self.subtract_points(self.config.attempt_penalty);
    }

    pub fn record_hint(&mut self) {
        self.hints_used += 1;
        self.subtract_points(self.config.hint_penalty);
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = if multiplier.is_nan() {
            1.0
        } else {
            multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER)
        };
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn score(&self) -> f64 {
        self.current_score
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    /// Whole seconds since the last reset; 0 if the ledger was never reset.
    pub fn time_elapsed(&self) -> u64 {
        self.time_elapsed_at(Utc::now())
    }

    pub fn time_elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        match self.started_at {
            Some(start) => (now - start).num_seconds().max(0) as u64,
            None => 0,
        }
    }

    pub fn calculate_time_bonus(&self, target_time: u32) -> u32 {
        self.time_bonus_for(self.time_elapsed(), target_time)
    }

    fn time_bonus_for(&self, elapsed: u64, target_time: u32) -> u32 {
        let target = u64::from(target_time);
        if elapsed >= target {
            return 0;
        }
        ((target - elapsed) as f64 * self.config.time_bonus_multiplier).floor() as u32
    }

    pub fn calculate_accuracy_bonus(&self) -> u32 {
        match self.attempts {
            0 => 0,
            1 => self.config.accuracy_bonus as u32,
            n => (self.config.accuracy_bonus / f64::from(n)).floor() as u32,
        }
    }

    pub fn calculate_hint_penalty(&self) -> u32 {
        (f64::from(self.hints_used) * self.config.hint_penalty) as u32
    }

    /// Final score for the attempt. Reads ledger state only, so calling it
    /// repeatedly gives the same answer for the same elapsed time.
    pub fn calculate_final_score(&self, stats: &MissionStats) -> u32 {
        self.final_score_at(self.time_elapsed(), stats)
    }

    fn final_score_at(&self, elapsed: u64, stats: &MissionStats) -> u32 {
        let total = self.current_score
            + f64::from(self.time_bonus_for(elapsed, stats.target_time))
            + f64::from(self.calculate_accuracy_bonus())
            - f64::from(self.calculate_hint_penalty());
        self.clamp(total).floor() as u32
    }

    pub fn score_rank(&self, score: u32) -> Rank {
        Rank::from_score(f64::from(score))
    }

    /// XP for a finished mission: base reward times the rank factor, times a
    /// further bonus for a perfect run.
    pub fn calculate_xp(&self, final_score: u32, mission: &Mission) -> u32 {
        let mut xp = f64::from(mission.rewards.xp) * self.score_rank(final_score).xp_factor();
        if self.is_perfect_score() {
            xp *= PERFECT_XP_FACTOR;
        }
        xp.floor() as u32
    }

    /// Credits scale from 50% to 150% of the base reward with the score ratio.
    pub fn calculate_credits(&self, final_score: u32, mission: &Mission) -> u32 {
        let ratio = f64::from(final_score) / self.config.max_score;
        (f64::from(mission.rewards.credits) * (0.5 + ratio)).floor() as u32
    }

    pub fn is_perfect_score(&self) -> bool {
        self.attempts == 1 && self.hints_used == 0
    }

    /// Stats record for the attempt so far.
    pub fn stats(&self, target_time: u32) -> MissionStats {
        MissionStats {
            attempts: self.attempts,
            hints_used: self.hints_used,
            time: self.time_elapsed(),
            target_time,
        }
    }

    // Not `f64::clamp`: a config with min > max must not panic.
    fn clamp(&self, score: f64) -> f64 {
        score.min(self.config.max_score).max(self.config.min_score)
    }
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::builtin_catalog;
    use chrono::Duration;

    fn stats(target_time: u32) -> MissionStats {
        MissionStats {
            attempts: 0,
            hints_used: 0,
            time: 0,
            target_time,
        }
    }

    fn mission() -> Mission {
        builtin_catalog().unwrap().first_mission().unwrap().clone()
    }

    #[test]
    fn reset_starts_at_base_score() {
        let mut ledger = ScoreLedger::default();
        ledger.add_points(300.0);
        ledger.record_hint();
        ledger.set_multiplier(3.0);

        ledger.reset();
        assert_eq!(ledger.score(), 1000.0);
        assert_eq!(ledger.attempts(), 0);
        assert_eq!(ledger.hints_used(), 0);
        assert_eq!(ledger.multiplier(), 1.0);
    }

    #[test]
    fn score_stays_within_bounds() {
        let mut ledger = ScoreLedger::default();
        ledger.reset();
        for delta in [5000.0, 12000.0, -3.5, 1e9] {
            ledger.add_points(delta);
            assert!((0.0..=9999.0).contains(&ledger.score()));
        }
        assert_eq!(ledger.score(), 9999.0);

        for delta in [100.0, 20000.0, 1.0] {
            ledger.subtract_points(delta);
            assert!((0.0..=9999.0).contains(&ledger.score()));
        }
        assert_eq!(ledger.score(), 0.0);

        ledger.add_points(-50.0);
        assert_eq!(ledger.score(), 0.0);
        ledger.add_points(f64::NAN);
        assert_eq!(ledger.score(), 0.0);
    }

    #[test]
    fn bonuses_scale_but_penalties_do_not() {
        let mut ledger = ScoreLedger::default();
        ledger.reset();
        ledger.set_multiplier(2.0);
        ledger.add_points(100.0);
        assert_eq!(ledger.score(), 1200.0);
        ledger.subtract_points(100.0);
        assert_eq!(ledger.score(), 1100.0);
    }

    #[test]
    fn multiplier_is_clamped() {
        let mut ledger = ScoreLedger::default();
        ledger.set_multiplier(0.05);
        assert_eq!(ledger.multiplier(), 0.1);
        ledger.set_multiplier(20.0);
        assert_eq!(ledger.multiplier(), 10.0);
    }

    #[test]
    fn attempts_and_hints_apply_fixed_penalties() {
        let mut ledger = ScoreLedger::default();
        ledger.reset();
        ledger.record_attempt();
        assert_eq!(ledger.score(), 950.0);
        ledger.record_hint();
        ledger.record_hint();
        assert_eq!(ledger.score(), 750.0);
        assert_eq!(ledger.calculate_hint_penalty(), 200);
    }

    #[test]
    fn elapsed_is_zero_before_reset() {
        let ledger = ScoreLedger::default();
        assert_eq!(ledger.time_elapsed(), 0);
    }

    #[test]
    fn time_bonus_decreases_with_elapsed_time() {
        let ledger = ScoreLedger::default();
        assert_eq!(ledger.time_bonus_for(10, 120), 550);
        assert_eq!(ledger.time_bonus_for(119, 120), 5);
        assert_eq!(ledger.time_bonus_for(120, 120), 0);
        assert_eq!(ledger.time_bonus_for(500, 120), 0);

        let mut last = u32::MAX;
        for elapsed in 0..120 {
            let bonus = ledger.time_bonus_for(elapsed, 120);
            assert!(bonus < last);
            last = bonus;
        }
    }

    #[test]
    fn accuracy_bonus_has_diminishing_returns() {
        let mut ledger = ScoreLedger::default();
        ledger.reset();
        assert_eq!(ledger.calculate_accuracy_bonus(), 0);

        ledger.record_attempt();
        assert_eq!(ledger.calculate_accuracy_bonus(), 500);

        let mut last = 500;
        for _ in 2..=10 {
            ledger.record_attempt();
            let bonus = ledger.calculate_accuracy_bonus();
            assert!(bonus < last);
            last = bonus;
        }
        assert_eq!(last, 50);
    }

    #[test]
    fn single_attempt_quick_finish_scores_two_thousand() {
        let mut ledger = ScoreLedger::default();
        ledger.reset_at(Utc::now() - Duration::seconds(10));
        ledger.record_attempt();

        assert_eq!(ledger.time_elapsed(), 10);
        // 950 running + 550 time + 500 accuracy - 0 hints
        assert_eq!(ledger.calculate_final_score(&stats(120)), 2000);
        assert_eq!(ledger.calculate_final_score(&stats(120)), 2000);
    }

    #[test]
    fn final_score_is_clamped() {
        let mut ledger = ScoreLedger::default();
        ledger.reset();
        ledger.add_points(9000.0);
        ledger.record_attempt();
        assert_eq!(ledger.final_score_at(0, &stats(1000)), 9999);

        ledger.reset();
        ledger.subtract_points(1000.0);
        for _ in 0..5 {
            ledger.record_hint();
        }
        assert_eq!(ledger.final_score_at(500, &stats(120)), 0);
    }

    #[test]
    fn perfect_run_multiplies_xp() {
        let mission = mission();
        let mut ledger = ScoreLedger::default();
        ledger.reset();
        ledger.record_attempt();
        assert!(ledger.is_perfect_score());

        // S rank doubles, perfect run adds another 1.5x.
        assert_eq!(ledger.calculate_xp(9500, &mission), 300);
        // F rank, perfect run only.
        assert_eq!(ledger.calculate_xp(100, &mission), 150);

        ledger.record_hint();
        assert!(!ledger.is_perfect_score());
        assert_eq!(ledger.calculate_xp(6000, &mission), 125);
        assert_eq!(ledger.calculate_xp(7500, &mission), 150);
    }

    #[test]
    fn credits_scale_with_score_ratio() {
        let mission = mission();
        let ledger = ScoreLedger::default();
        assert_eq!(ledger.calculate_credits(0, &mission), 25);
        assert_eq!(ledger.calculate_credits(9999, &mission), 75);
        assert_eq!(ledger.calculate_credits(2000, &mission), 35);
    }

    #[test]
    fn custom_limits_are_respected() {
        let config = ScoringConfig {
            max_score: 500.0,
            ..ScoringConfig::default()
        };
        let mut ledger = ScoreLedger::new(config);
        ledger.reset();
        assert_eq!(ledger.score(), 500.0);
    }
}
