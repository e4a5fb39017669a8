//! Analyzer settings storage
//!
//! Stores analyzer and similarity defaults plus an optional database path in a
//! JSON file in the app config directory. Settings are plain values passed to
//! whoever needs them; nothing is cached process-wide.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::graph_analysis::AnalyzerConfig;

const APP_DIR: &str = "com.mycelica.app";
const SETTINGS_FILE: &str = "graph-analysis.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    #[serde(default = "default_similar_top_n")]
    pub top_n: usize,
    /// Inclusive lower bound on cosine similarity (default: 0.15)
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,
}

fn default_similar_top_n() -> usize {
    10
}

fn default_min_similarity() -> f32 {
    0.15
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            top_n: default_similar_top_n(),
            min_similarity: default_min_similarity(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Database to analyze when `--db` is not given
    #[serde(default)]
    pub db_path: Option<String>,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
}

impl Settings {
    /// Load settings from disk. A missing file yields defaults; a file that
    /// exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save settings to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }
}

/// `<config_dir>/com.mycelica.app/graph-analysis.json`, falling back to the
/// working directory when the platform has no config dir.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(SETTINGS_FILE)
}

/// `<data_dir>/com.mycelica.app/mycelica.db`
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("mycelica.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.analyzer.hub_threshold, 10);
        assert_eq!(settings.analyzer.top_n, 50);
        assert_eq!(settings.analyzer.stale_days, 30);
        assert_eq!(settings.similarity.top_n, 10);
        assert!((settings.similarity.min_similarity - 0.15).abs() < f32::EPSILON);
        assert!(settings.db_path.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"analyzer": {"stale_days": 90}, "similarity": {"top_n": 3}}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.analyzer.stale_days, 90);
        assert_eq!(settings.analyzer.hub_threshold, 10);
        assert_eq!(settings.similarity.top_n, 3);
        assert!((settings.similarity.min_similarity - 0.15).abs() < f32::EPSILON);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Settings::load(&path), Err(LoadError::Settings(_))));
    }

    #[test]
    fn test_save_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("settings.json");
        let settings = Settings {
            db_path: Some("/tmp/graph.db".to_string()),
            analyzer: AnalyzerConfig { hub_threshold: 4, top_n: 7, stale_days: 14 },
            similarity: SimilarityConfig { top_n: 2, min_similarity: 0.5 },
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_default_paths_under_app_dir() {
        let path = default_path();
        assert!(path.ends_with(Path::new(APP_DIR).join(SETTINGS_FILE)));
        assert!(default_db_path().ends_with(Path::new(APP_DIR).join("mycelica.db")));
    }
}
