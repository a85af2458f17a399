use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CYBER_OPS_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "cyber-ops.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Mission catalog to load instead of the built-in one.
    pub catalog: Option<PathBuf>,
    pub scoring: ScoringConfig,
    pub storage: StorageConfig,
    pub autosave: AutoSaveConfig,
}

/// Score ledger constants. Every field can be overridden from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub base_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub attempt_penalty: f64,
    pub hint_penalty: f64,
    pub time_bonus_multiplier: f64,
    pub accuracy_bonus: f64,
    /// Awarded when a puzzle is solved, scaled by the difficulty multiplier.
    pub solve_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_score: 1000.0,
            min_score: 0.0,
            max_score: 9999.0,
            attempt_penalty: 50.0,
            hint_penalty: 100.0,
            time_bonus_multiplier: 5.0,
            accuracy_bonus: 500.0,
            solve_bonus: 250.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub key_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".cyber-ops"),
            key_prefix: "cyberops_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
        }
    }
}

pub fn load_config(path: &Path) -> Result<GameConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: GameConfig =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Loads the config named by `CYBER_OPS_CONFIG`, else `cyber-ops.toml` in the
/// working directory, else the built-in defaults.
pub fn resolve_config() -> Result<GameConfig> {
    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() {
        load_config(&path)
    } else {
        Ok(GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: GameConfig = toml::from_str("[autosave]\ninterval_secs = 5\n").unwrap();
        assert_eq!(config.autosave.interval_secs, 5);
        assert!(config.autosave.enabled);
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.storage.key_prefix, "cyberops_");
        assert!(config.catalog.is_none());
    }

    #[test]
    fn load_config_reads_scoring_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cyber-ops.toml");
        std::fs::write(
            &path,
            "[scoring]\nmax_score = 5000.0\nhint_penalty = 25.0\n\n[storage]\nkey_prefix = \"test_\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.scoring.max_score, 5000.0);
        assert_eq!(config.scoring.hint_penalty, 25.0);
        assert_eq!(config.scoring.base_score, 1000.0);
        assert_eq!(config.storage.key_prefix, "test_");
    }

    #[test]
    fn load_config_reports_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[scoring\nmax_score = ").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }
}
