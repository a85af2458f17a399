pub mod catalog;
pub mod loader;
pub mod types;

pub use catalog::MissionCatalog;
pub use loader::{builtin_catalog, load_catalog, parse_catalog, BUILTIN_CATALOG};
pub use types::{Mission, PuzzleParams, Section};
