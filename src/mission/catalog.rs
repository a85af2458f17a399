use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};

use super::types::{Mission, PuzzleParams, Section};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog contains no missions")]
    Empty,

    #[error("duplicate mission id {0}")]
    DuplicateId(u32),

    #[error("section {section:?} has two missions at level {level}")]
    DuplicateLevel { section: Section, level: u32 },

    #[error("mission {id}: puzzle kind does not match mission type")]
    PuzzleTypeMismatch { id: u32 },

    #[error("mission {id}: {reason}")]
    BadPuzzle { id: u32, reason: String },

    #[error("section {section:?} must start with exactly one unlocked level 1 mission (found {found})")]
    BadSectionStart { section: Section, found: usize },
}

/// The ordered mission list plus the lookups the controller needs.
#[derive(Debug, Clone)]
pub struct MissionCatalog {
    missions: Vec<Mission>,
    definitions: Vec<Mission>,
}

impl MissionCatalog {
    pub fn new(missions: Vec<Mission>) -> Result<Self, CatalogError> {
        validate(&missions)?;
        Ok(Self {
            definitions: missions.clone(),
            missions,
        })
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    /// Position of a mission in catalog order.
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.missions.iter().position(|m| m.id == id)
    }

    pub fn get(&self, id: u32) -> Option<&Mission> {
        self.index_of(id).map(|i| &self.missions[i])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Mission> {
        let index = self.index_of(id)?;
        self.missions.get_mut(index)
    }

    pub fn first_mission(&self) -> Option<&Mission> {
        self.missions.first()
    }

    /// Missions of one section, ordered by level.
    pub fn in_section(&self, section: Section) -> Vec<&Mission> {
        let mut list: Vec<&Mission> = self
            .missions
            .iter()
            .filter(|m| m.section == section)
            .collect();
        list.sort_by_key(|m| m.level);
        list
    }

    pub fn next_in_section(&self, mission: &Mission) -> Option<&Mission> {
        self.missions
            .iter()
            .find(|m| m.section == mission.section && m.level == mission.level + 1)
    }

    /// Unlocks the mission one level above `level` in `section`. Returns its id
    /// when something was unlocked; `None` at the end of a section or when it
    /// was already open.
    pub fn unlock_next_level_in_section(&mut self, section: Section, level: u32) -> Option<u32> {
        let next = self
            .missions
            .iter_mut()
            .find(|m| m.section == section && m.level == level + 1)?;
        if !next.locked {
            return None;
        }
        next.locked = false;
        info!(mission = next.id, ?section, level = next.level, "mission unlocked");
        Some(next.id)
    }

    /// Opens a mission regardless of chain position. Locking is never undone.
    pub fn force_unlock(&mut self, id: u32) -> bool {
        match self.get_mut(id) {
            Some(mission) => {
                mission.locked = false;
                true
            }
            None => false,
        }
    }

    pub fn completion_count(&self) -> usize {
        self.missions.iter().filter(|m| m.completed).count()
    }

    /// Restores the lock and completion flags the catalog was built with.
    pub fn reset_progress(&mut self) {
        for (mission, def) in self.missions.iter_mut().zip(&self.definitions) {
            mission.completed = def.completed;
            mission.locked = def.locked;
            mission.best_score = def.best_score;
        }
        debug!("catalog progress reset");
    }
}

fn validate(missions: &[Mission]) -> Result<(), CatalogError> {
    if missions.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut ids = HashSet::new();
    let mut levels = HashSet::new();
    for mission in missions {
        if !ids.insert(mission.id) {
            return Err(CatalogError::DuplicateId(mission.id));
        }
        if !levels.insert((mission.section, mission.level)) {
            return Err(CatalogError::DuplicateLevel {
                section: mission.section,
                level: mission.level,
            });
        }
        if mission.params.mission_type() != mission.mission_type {
            return Err(CatalogError::PuzzleTypeMismatch { id: mission.id });
        }
        if let Err(reason) = check_puzzle(&mission.params) {
            return Err(CatalogError::BadPuzzle {
                id: mission.id,
                reason,
            });
        }
    }

    let mut open_starts: HashMap<Section, usize> = HashMap::new();
    let mut present: HashSet<Section> = HashSet::new();
    for mission in missions {
        present.insert(mission.section);
        if mission.level == 1 && !mission.locked {
            *open_starts.entry(mission.section).or_default() += 1;
        }
    }
    for section in present {
        let found = open_starts.get(&section).copied().unwrap_or(0);
        if found != 1 {
            return Err(CatalogError::BadSectionStart { section, found });
        }
    }

    Ok(())
}

/// Rejects puzzle setups that no answer can solve.
fn check_puzzle(params: &PuzzleParams) -> Result<(), String> {
    match params {
        PuzzleParams::Password { solution, .. } => {
            if solution.trim().is_empty() {
                return Err("password solution is empty".into());
            }
        }
        PuzzleParams::Firewall { ports } => {
            if ports.is_empty() {
                return Err("firewall has no ports to knock".into());
            }
        }
        PuzzleParams::Network { nodes, path } => {
            if path.is_empty() {
                return Err("network path is empty".into());
            }
            if let Some(missing) = path
                .iter()
                .find(|p| !nodes.iter().any(|n| n.eq_ignore_ascii_case(p)))
            {
                return Err(format!("path node '{missing}' is not in nodes"));
            }
        }
        PuzzleParams::Malware { samples, signature } => {
            if !samples.iter().any(|s| s.eq_ignore_ascii_case(signature)) {
                return Err(format!("signature '{signature}' is not among the samples"));
            }
        }
        PuzzleParams::Phishing { messages, phishing } => {
            if phishing.is_empty() {
                return Err("no message is marked as phishing".into());
            }
            if let Some(bad) = phishing.iter().find(|&&n| n == 0 || n > messages.len()) {
                return Err(format!(
                    "phishing index {bad} is outside 1..={}",
                    messages.len()
                ));
            }
        }
    }
    Ok(())
}
