pub mod ledger;
pub mod rank;

pub use ledger::{MissionStats, ScoreLedger};
pub use rank::Rank;
