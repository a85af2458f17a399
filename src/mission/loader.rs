use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::catalog::MissionCatalog;
use super::types::Mission;

/// Mission definitions compiled into the binary.
pub const BUILTIN_CATALOG: &str = include_str!("../../missions/catalog.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "mission")]
    missions: Vec<Mission>,
}

pub fn parse_catalog(content: &str) -> Result<MissionCatalog> {
    let file: CatalogFile = toml::from_str(content)?;
    let catalog = MissionCatalog::new(file.missions)?;
    Ok(catalog)
}

pub fn load_catalog(path: &Path) -> Result<MissionCatalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading mission catalog {}", path.display()))?;
    parse_catalog(&content).with_context(|| format!("loading mission catalog {}", path.display()))
}

pub fn builtin_catalog() -> Result<MissionCatalog> {
    parse_catalog(BUILTIN_CATALOG)
}
