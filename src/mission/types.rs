use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_XP: u32 = 100;
pub const DEFAULT_CREDITS: u32 = 50;
pub const DEFAULT_TARGET_TIME_SECS: u32 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct Mission {
    pub id: u32,
    pub section: Section,
    pub level: u32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub mission_type: MissionType,
    #[serde(rename = "puzzle")]
    pub params: PuzzleParams,
    #[serde(default = "default_ai_speed")]
    pub ai_speed_multiplier: f64,
    #[serde(default = "default_target_time")]
    pub target_time: u32,
    #[serde(default)]
    pub rewards: Rewards,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_locked")]
    pub locked: bool,
    #[serde(default)]
    pub best_score: u32,
}

fn default_ai_speed() -> f64 {
    1.0
}

fn default_target_time() -> u32 {
    DEFAULT_TARGET_TIME_SECS
}

fn default_locked() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Password,
    Network,
    Malware,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Password, Section::Network, Section::Malware];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Password => write!(f, "Password Ops"),
            Section::Network => write!(f, "Network Ops"),
            Section::Malware => write!(f, "Malware Ops"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Score multiplier applied to bonuses earned during the mission.
    pub fn score_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "EASY"),
            Difficulty::Medium => write!(f, "MEDIUM"),
            Difficulty::Hard => write!(f, "HARD"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionType {
    Password,
    Firewall,
    Network,
    Malware,
    Phishing,
}

impl fmt::Display for MissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionType::Password => write!(f, "password"),
            MissionType::Firewall => write!(f, "firewall"),
            MissionType::Network => write!(f, "network"),
            MissionType::Malware => write!(f, "malware"),
            MissionType::Phishing => write!(f, "phishing"),
        }
    }
}

/// Puzzle setup handed to the puzzle layer. The variant must agree with the
/// mission's `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PuzzleParams {
    Password {
        solution: String,
        #[serde(default)]
        charset: Option<String>,
    },
    Firewall {
        ports: Vec<u16>,
    },
    Network {
        nodes: Vec<String>,
        path: Vec<String>,
    },
    Malware {
        samples: Vec<String>,
        signature: String,
    },
    Phishing {
        messages: Vec<String>,
        phishing: Vec<usize>,
    },
}

impl PuzzleParams {
    pub fn mission_type(&self) -> MissionType {
        match self {
            PuzzleParams::Password { .. } => MissionType::Password,
            PuzzleParams::Firewall { .. } => MissionType::Firewall,
            PuzzleParams::Network { .. } => MissionType::Network,
            PuzzleParams::Malware { .. } => MissionType::Malware,
            PuzzleParams::Phishing { .. } => MissionType::Phishing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Rewards {
    #[serde(default = "default_xp")]
    pub xp: u32,
    #[serde(default = "default_credits")]
    pub credits: u32,
}

fn default_xp() -> u32 {
    DEFAULT_XP
}

fn default_credits() -> u32 {
    DEFAULT_CREDITS
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            xp: DEFAULT_XP,
            credits: DEFAULT_CREDITS,
        }
    }
}
