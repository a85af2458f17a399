pub mod check;
pub mod opponent;

pub use check::{check_answer, Verdict};
pub use opponent::Opponent;
