use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mission::{Mission, MissionCatalog};
use crate::score::{MissionStats, Rank, ScoreLedger};
use crate::storage::{Migration, ProgressStore, Storage};

pub const PROGRESS_KEY: &str = "progress";
pub const SETTINGS_KEY: &str = "settings";
pub const STATS_KEY: &str = "stats";

/// Rewrites for payloads saved by older releases, applied by the store on
/// load. Empty while the save format is unchanged since 0.1.0.
pub fn save_migrations() -> Vec<Migration> {
    Vec::new()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProgress {
    pub missions: Vec<SavedMission>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMission {
    pub id: u32,
    pub completed: bool,
    pub locked: bool,
    pub best_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub sound_enabled: bool,
    pub effects_volume: f32,
    pub show_hints: bool,
    pub auto_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            effects_volume: 0.7,
            show_hints: true,
            auto_save: true,
        }
    }
}

/// Career totals across every mission played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_xp: u64,
    pub credits: u64,
    pub missions_completed: u32,
    pub perfect_missions: u32,
    pub missions_failed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionOutcome {
    pub mission_id: u32,
    pub success: bool,
    pub stats: MissionStats,
    pub final_score: u32,
    pub rank: Rank,
    pub xp: u32,
    pub credits: u32,
    pub new_best: bool,
    pub unlocked: Option<u32>,
}

/// One-way signals for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Notify { severity: Severity, message: String },
    MissionStarted { mission_id: u32 },
    MissionResults(MissionOutcome),
}

/// Mission lifecycle: start, score, unlock, persist.
#[derive(Debug)]
pub struct Game<S> {
    catalog: MissionCatalog,
    ledger: ScoreLedger,
    store: ProgressStore<S>,
    active: Option<u32>,
    settings: Settings,
    stats: PlayerStats,
    events: Vec<GameEvent>,
}

impl<S: Storage> Game<S> {
    pub fn new(catalog: MissionCatalog, ledger: ScoreLedger, store: ProgressStore<S>) -> Self {
        Self {
            catalog,
            ledger,
            store,
            active: None,
            settings: Settings::default(),
            stats: PlayerStats::default(),
            events: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ScoreLedger {
        &mut self.ledger
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn player_stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn active_mission_id(&self) -> Option<u32> {
        self.active
    }

    pub fn active_mission(&self) -> Option<&Mission> {
        self.active.and_then(|id| self.catalog.get(id))
    }

    pub fn has_saved_progress(&self) -> bool {
        self.store.has_data(PROGRESS_KEY)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        self.events.push(GameEvent::Notify {
            severity,
            message: message.into(),
        });
    }

    /// Wipes saved progress and starts the first mission of the catalog.
    pub fn start_new_game(&mut self) -> bool {
        self.reset_progress();
        let Some(first) = self.catalog.first_mission().map(|m| m.id) else {
            return false;
        };
        self.catalog.force_unlock(first);
        self.start_mission(first)
    }

    /// Deletes saved progress and stats and restores the catalog's initial
    /// lock state. Settings are kept.
    pub fn reset_progress(&mut self) {
        self.store.delete_data(PROGRESS_KEY);
        self.store.delete_data(STATS_KEY);
        self.catalog.reset_progress();
        self.stats = PlayerStats::default();
        self.active = None;
        info!("progress reset");
    }

    /// Begins an attempt. Locked or unknown missions are refused with a
    /// notification and `false`.
    pub fn start_mission(&mut self, id: u32) -> bool {
        let Some(mission) = self.catalog.get(id) else {
            warn!(mission = id, "start requested for unknown mission");
            self.notify(Severity::Error, format!("Mission {id} does not exist."));
            return false;
        };
        if mission.locked {
            warn!(mission = id, "start requested for locked mission");
            let message = format!(
                "\"{}\" is locked. Complete the previous level first.",
                mission.title
            );
            self.notify(Severity::Warning, message);
            return false;
        }

        let multiplier = mission.difficulty.score_multiplier();
        info!(mission = id, title = %mission.title, "mission started");
        self.ledger.reset();
        self.ledger.set_multiplier(multiplier);
        self.active = Some(id);
        self.events.push(GameEvent::MissionStarted { mission_id: id });
        true
    }

    /// Scores and closes the active attempt. Only the first call per attempt
    /// has any effect; later calls return `None`.
    pub fn complete_mission(&mut self, success: bool, stats: &MissionStats) -> Option<MissionOutcome> {
        let id = self.active.take()?;
        let final_score = self.ledger.calculate_final_score(stats);
        let rank = self.ledger.score_rank(final_score);

        let Some(mission) = self.catalog.get_mut(id) else {
            warn!(mission = id, "active mission vanished from catalog");
            return None;
        };

        let mut outcome = MissionOutcome {
            mission_id: id,
            success,
            stats: *stats,
            final_score,
            rank,
            xp: 0,
            credits: 0,
            new_best: false,
            unlocked: None,
        };

        if success {
            mission.completed = true;
            outcome.new_best = final_score > mission.best_score;
            mission.best_score = mission.best_score.max(final_score);
            outcome.xp = self.ledger.calculate_xp(final_score, mission);
            outcome.credits = self.ledger.calculate_credits(final_score, mission);
            let (section, level) = (mission.section, mission.level);
            let title = mission.title.clone();
            outcome.unlocked = self.catalog.unlock_next_level_in_section(section, level);
            match outcome.unlocked.and_then(|next| self.catalog.get(next)) {
                Some(next) => {
                    let message = format!("{title} complete. New mission unlocked: {}", next.title);
                    self.notify(Severity::Info, message);
                }
                None => self.notify(Severity::Success, format!("{title} complete.")),
            }

            self.stats.total_xp += u64::from(outcome.xp);
            self.stats.credits += u64::from(outcome.credits);
            self.stats.missions_completed += 1;
            if self.ledger.is_perfect_score() {
                self.stats.perfect_missions += 1;
            }
        } else {
            self.stats.missions_failed += 1;
        }

        info!(
            mission = id,
            success,
            final_score,
            rank = %rank,
            xp = outcome.xp,
            credits = outcome.credits,
            "mission finished"
        );

        self.save_progress();
        self.events.push(GameEvent::MissionResults(outcome.clone()));
        Some(outcome)
    }

    pub fn saved_progress(&self) -> SavedProgress {
        SavedProgress {
            missions: self
                .catalog
                .missions()
                .iter()
                .map(|m| SavedMission {
                    id: m.id,
                    completed: m.completed,
                    locked: m.locked,
                    best_score: m.best_score,
                })
                .collect(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Persists mission state and player stats. A failure leaves in-memory
    /// state untouched; the next save tries again.
    pub fn save_progress(&mut self) -> bool {
        let progress = self.saved_progress();
        let saved = self.store.save_data(PROGRESS_KEY, &progress)
            && self.store.save_data(STATS_KEY, &self.stats);
        if !saved {
            self.notify(Severity::Warning, "Progress could not be saved.");
        }
        saved
    }

    /// Applies the saved mission state and stats. Returns `false` for a fresh
    /// game. A saved lock never re-locks a mission that is already open.
    pub fn load_progress(&mut self) -> bool {
        let Some(progress) = self.store.load_data::<SavedProgress>(PROGRESS_KEY) else {
            return false;
        };

        let mut applied = 0;
        for saved in &progress.missions {
            match self.catalog.get_mut(saved.id) {
                Some(mission) => {
                    mission.completed = saved.completed;
                    mission.locked = mission.locked && saved.locked;
                    mission.best_score = saved.best_score;
                    applied += 1;
                }
                None => warn!(mission = saved.id, "saved mission not in catalog"),
            }
        }
        if let Some(stats) = self.store.load_data::<PlayerStats>(STATS_KEY) {
            self.stats = stats;
        }
        info!(applied, saved_at = progress.timestamp, "progress loaded");
        true
    }

    pub fn load_settings(&mut self) {
        if let Some(settings) = self.store.load_data::<Settings>(SETTINGS_KEY) {
            self.settings = settings;
        }
    }

    pub fn update_settings(&mut self, mut settings: Settings) -> bool {
        settings.effects_volume = settings.effects_volume.clamp(0.0, 1.0);
        self.settings = settings;
        self.store.save_data(SETTINGS_KEY, &self.settings)
    }

    pub fn export_save(&self) -> Option<String> {
        self.store.export_data()
    }

    /// Replaces every stored key with the export's contents and reapplies
    /// them to the session. Keys missing from the export are gone afterwards.
    pub fn import_save(&mut self, json: &str) -> bool {
        if !self.store.import_data(json) {
            self.notify(Severity::Error, "Import failed: not a valid save export.");
            return false;
        }
        self.catalog.reset_progress();
        self.stats = PlayerStats::default();
        self.settings = Settings::default();
        self.load_progress();
        self.load_settings();
        true
    }

    /// Deletes every key this game stored, settings included, and returns
    /// the session to a fresh state.
    pub fn wipe_saved_data(&mut self) -> bool {
        let cleared = self.store.clear_all_data();
        self.catalog.reset_progress();
        self.stats = PlayerStats::default();
        self.settings = Settings::default();
        self.active = None;
        if !cleared {
            self.notify(Severity::Warning, "Some saved data could not be deleted.");
        }
        info!(cleared, "saved data wiped");
        cleared
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mission::{builtin_catalog, Section};
    use crate::storage::{MemoryStorage, Storage};
    use chrono::Duration;

    pub(crate) fn new_game() -> Game<MemoryStorage> {
        game_with(MemoryStorage::new())
    }

    fn game_with(storage: MemoryStorage) -> Game<MemoryStorage> {
        Game::new(
            builtin_catalog().unwrap(),
            ScoreLedger::default(),
            ProgressStore::new(storage, "cyberops_", "1.0.0"),
        )
    }

    fn stats(game: &Game<MemoryStorage>) -> MissionStats {
        let target = game.active_mission().map(|m| m.target_time).unwrap_or(120);
        game.ledger().stats(target)
    }

    fn play(game: &mut Game<MemoryStorage>, id: u32, success: bool) -> Option<MissionOutcome> {
        assert!(game.start_mission(id));
        game.ledger_mut().record_attempt();
        let stats = stats(game);
        game.complete_mission(success, &stats)
    }

    #[test]
    fn new_game_starts_first_mission_with_base_score() {
        let mut game = new_game();
        assert!(game.start_new_game());
        assert_eq!(game.active_mission_id(), Some(1));
        assert_eq!(game.ledger().score(), 1000.0);
        assert!(game
            .drain_events()
            .contains(&GameEvent::MissionStarted { mission_id: 1 }));
    }

    #[test]
    fn quick_single_attempt_run_scores_two_thousand() {
        let mut game = new_game();
        game.start_new_game();
        game.ledger_mut()
            .reset_at(Utc::now() - Duration::seconds(10));
        game.ledger_mut().record_attempt();

        let outcome = game
            .complete_mission(
                true,
                &MissionStats {
                    attempts: 1,
                    hints_used: 0,
                    time: 10,
                    target_time: 120,
                },
            )
            .unwrap();
        assert_eq!(outcome.final_score, 2000);
        assert_eq!(outcome.rank, Rank::D);
        assert_eq!(game.catalog().get(1).unwrap().best_score, 2000);
    }

    #[test]
    fn locked_mission_is_refused_with_notification() {
        let mut game = new_game();
        assert!(game.catalog().get(5).unwrap().locked);
        assert!(!game.start_mission(5));
        assert_eq!(game.active_mission_id(), None);

        let events = game.drain_events();
        assert!(matches!(
            events.as_slice(),
            [GameEvent::Notify {
                severity: Severity::Warning,
                ..
            }]
        ));
    }

    #[test]
    fn unknown_mission_is_refused() {
        let mut game = new_game();
        assert!(!game.start_mission(999));
        assert_eq!(game.active_mission_id(), None);
    }

    #[test]
    fn completion_without_active_mission_is_a_no_op() {
        let mut game = new_game();
        let stats = game.ledger().stats(120);
        assert_eq!(game.complete_mission(true, &stats), None);
        assert!(!game.store.has_data(PROGRESS_KEY));
    }

    #[test]
    fn success_unlocks_next_level_in_same_section() {
        let mut game = new_game();
        let outcome = play(&mut game, 4, true).unwrap();

        assert_eq!(outcome.unlocked, Some(5));
        let catalog = game.catalog();
        assert!(catalog.get(4).unwrap().completed);
        assert!(!catalog.get(5).unwrap().locked);
        // Other sections are untouched.
        assert!(catalog.in_section(Section::Password)[1].locked);
        assert!(catalog.in_section(Section::Malware)[1].locked);
    }

    #[test]
    fn second_completion_is_ignored() {
        let mut game = new_game();
        let first = play(&mut game, 1, false);
        assert!(first.is_some());

        let stats = game.ledger().stats(120);
        assert_eq!(game.complete_mission(true, &stats), None);
        assert!(!game.catalog().get(1).unwrap().completed);
    }

    #[test]
    fn failure_saves_but_does_not_complete_or_unlock() {
        let mut game = new_game();
        let outcome = play(&mut game, 11, false).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.xp, 0);
        assert_eq!(outcome.unlocked, None);
        assert!(!game.catalog().get(11).unwrap().completed);
        assert!(game.catalog().get(13).unwrap().locked);
        assert_eq!(game.player_stats().missions_failed, 1);
        assert!(game.store.has_data(PROGRESS_KEY));
    }

    #[test]
    fn best_score_only_rises() {
        let mut game = new_game();
        let first = play(&mut game, 1, true).unwrap();
        assert!(first.new_best);

        assert!(game.start_mission(1));
        for _ in 0..5 {
            game.ledger_mut().record_hint();
        }
        game.ledger_mut().record_attempt();
        let stats = stats(&game);
        let second = game.complete_mission(true, &stats).unwrap();

        assert!(second.final_score < first.final_score);
        assert!(!second.new_best);
        assert_eq!(game.catalog().get(1).unwrap().best_score, first.final_score);
    }

    #[test]
    fn rewards_accumulate_in_player_stats() {
        let mut game = new_game();
        let a = play(&mut game, 1, true).unwrap();
        let b = play(&mut game, 4, true).unwrap();

        let stats = game.player_stats();
        assert_eq!(stats.missions_completed, 2);
        assert_eq!(stats.perfect_missions, 2);
        assert_eq!(stats.total_xp, u64::from(a.xp + b.xp));
        assert_eq!(stats.credits, u64::from(a.credits + b.credits));
    }

    #[test]
    fn save_then_load_round_trips_mission_state() {
        let mut game = new_game();
        play(&mut game, 1, true);
        play(&mut game, 4, true);
        play(&mut game, 5, false);
        assert!(game.save_progress());
        let before = game.saved_progress().missions;

        let mut restored = game_with(game.store.storage().clone());
        assert!(restored.load_progress());
        assert_eq!(restored.saved_progress().missions, before);
        assert_eq!(restored.player_stats(), game.player_stats());
    }

    #[test]
    fn load_on_fresh_storage_is_a_no_op() {
        let mut game = new_game();
        assert!(!game.load_progress());
        assert_eq!(game.catalog().completion_count(), 0);
    }

    #[test]
    fn load_never_relocks_an_open_mission() {
        let mut game = new_game();
        let mut progress = game.saved_progress();
        for saved in &mut progress.missions {
            saved.locked = true;
        }
        game.store.save_data(PROGRESS_KEY, &progress);

        game.load_progress();
        assert!(!game.catalog().get(1).unwrap().locked);
    }

    #[test]
    fn storage_failure_keeps_session_state() {
        let mut game = game_with(MemoryStorage::with_quota(64));
        let outcome = play(&mut game, 1, true).unwrap();

        assert!(outcome.success);
        assert!(game.catalog().get(1).unwrap().completed);
        assert!(!game.catalog().get(2).unwrap().locked);
        assert!(!game.store.has_data(PROGRESS_KEY));
        assert!(game.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::Notify {
                severity: Severity::Warning,
                ..
            }
        )));
    }

    #[test]
    fn new_game_discards_previous_progress() {
        let mut game = new_game();
        play(&mut game, 1, true);
        assert!(!game.catalog().get(2).unwrap().locked);

        game.start_new_game();
        assert!(game.catalog().get(2).unwrap().locked);
        assert_eq!(game.catalog().completion_count(), 0);
        assert_eq!(game.player_stats(), &PlayerStats::default());
        assert!(!game.store.has_data(STATS_KEY));
    }

    #[test]
    fn settings_persist_and_clamp_volume() {
        let mut game = new_game();
        let settings = Settings {
            effects_volume: 3.0,
            sound_enabled: false,
            ..Settings::default()
        };
        assert!(game.update_settings(settings));
        assert_eq!(game.settings().effects_volume, 1.0);

        let mut other = game_with(game.store.storage().clone());
        other.load_settings();
        assert!(!other.settings().sound_enabled);
        assert_eq!(other.settings().effects_volume, 1.0);
    }

    #[test]
    fn import_restores_exported_session() {
        let mut game = new_game();
        play(&mut game, 11, true);
        let export = game.export_save().unwrap();

        let mut other = new_game();
        assert!(other.import_save(&export));
        assert!(other.catalog().get(11).unwrap().completed);
        assert!(!other.catalog().get(13).unwrap().locked);

        assert!(!other.import_save("{ broken"));
    }

    #[test]
    fn import_drops_keys_missing_from_the_export() {
        let mut game = new_game();
        play(&mut game, 1, true);
        let export = game.export_save().unwrap();

        let mut other = new_game();
        other.update_settings(Settings {
            show_hints: false,
            ..Settings::default()
        });
        assert!(other.store.has_data(SETTINGS_KEY));

        assert!(other.import_save(&export));
        assert!(!other.store.has_data(SETTINGS_KEY));
        assert_eq!(other.settings(), &Settings::default());
        assert!(other.catalog().get(1).unwrap().completed);
    }

    #[test]
    fn failed_import_leaves_stored_data_alone() {
        let mut game = new_game();
        play(&mut game, 1, true);
        assert!(!game.import_save(r#"{"progress": {"nope": true}}"#));
        assert!(game.has_saved_progress());
        assert!(game.catalog().get(1).unwrap().completed);
    }

    #[test]
    fn wipe_clears_every_key_and_session_state() {
        let mut game = new_game();
        play(&mut game, 1, true);
        game.update_settings(Settings {
            sound_enabled: false,
            ..Settings::default()
        });
        game.store.storage_mut().set("otherapp_key", "{}").unwrap();

        assert!(game.wipe_saved_data());
        assert!(!game.has_saved_progress());
        assert!(game.store.get_all_keys().is_empty());
        assert!(game.store.storage().get("otherapp_key").unwrap().is_some());
        assert!(game.settings().sound_enabled);
        assert_eq!(game.catalog().completion_count(), 0);
        assert_eq!(game.player_stats(), &PlayerStats::default());
    }
}
