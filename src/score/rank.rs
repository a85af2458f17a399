use serde::{Deserialize, Serialize};
use std::fmt;

/// Score tier awarded at the end of a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    S,
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Rank {
    /// Inclusive lower bounds, highest first. The first match wins.
    const BREAKPOINTS: [(f64, Rank); 6] = [
        (9000.0, Rank::S),
        (7500.0, Rank::APlus),
        (6000.0, Rank::A),
        (4500.0, Rank::B),
        (3000.0, Rank::C),
        (1500.0, Rank::D),
    ];

    pub fn from_score(score: f64) -> Self {
        Self::BREAKPOINTS
            .iter()
            .find(|(floor, _)| score >= *floor)
            .map(|(_, rank)| *rank)
            .unwrap_or(Rank::F)
    }

    pub fn grade(self) -> &'static str {
        match self {
            Rank::S => "S",
            Rank::APlus => "A+",
            Rank::A => "A",
            Rank::B => "B",
            Rank::C => "C",
            Rank::D => "D",
            Rank::F => "F",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Rank::S => "ELITE",
            Rank::APlus => "MASTER",
            Rank::A => "EXPERT",
            Rank::B => "PROFICIENT",
            Rank::C => "COMPETENT",
            Rank::D => "NOVICE",
            Rank::F => "BEGINNER",
        }
    }

    /// XP multiplier granted by this tier.
    pub fn xp_factor(self) -> f64 {
        match self {
            Rank::S => 2.0,
            Rank::APlus => 1.5,
            Rank::A => 1.25,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.grade(), self.title())
    }
}
