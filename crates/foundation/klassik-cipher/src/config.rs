//! Lab configuration
//!
//! Defaults for the tunable parts of the toolkit, stored as JSON so they
//! survive between sessions.

use crate::ciphers::DEFAULT_VIGENERE_KEY;
use crate::hill::HillKey;
use crate::kasiski;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Thresholds used by the statistical analyses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Letters needed before key lengths are estimated
    pub ic_min_letters: usize,

    /// Longest key length tried by the IC estimator
    pub max_key_length: usize,

    /// How many ranked candidates to report
    pub top_candidates: usize,

    /// Default n-gram length for Kasiski examination
    pub kasiski_gram_length: usize,

    /// How many of the most frequent distances are factored
    pub kasiski_top_distances: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ic_min_letters: 20,
            max_key_length: 10,
            top_candidates: 5,
            kasiski_gram_length: 3,
            kasiski_top_distances: 10,
        }
    }
}

/// Persistent lab settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Version for migration support
    pub version: u32,

    /// Vigenère key used when the supplied one has no letters
    pub vigenere_default_key: String,

    /// Hill key used when none is given
    pub hill_default_key: Vec<Vec<i64>>,

    pub analysis: AnalysisConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            version: 1,
            vigenere_default_key: DEFAULT_VIGENERE_KEY.to_string(),
            hill_default_key: HillKey::default().rows().to_vec(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl LabConfig {
    pub fn hill_key(&self) -> Result<HillKey> {
        HillKey::new(self.hill_default_key.clone())
    }

    /// Reject settings the analyses cannot run with.
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.max_key_length < 2 {
            return Err(Error::Config(format!(
                "max_key_length must be at least 2, got {}", analysis.max_key_length
            )));
        }
        if analysis.top_candidates == 0 {
            return Err(Error::Config("top_candidates must be at least 1".into()));
        }
        if !(kasiski::MIN_GRAM..=kasiski::MAX_GRAM).contains(&analysis.kasiski_gram_length) {
            return Err(Error::Config(format!(
                "kasiski_gram_length must be within {}..={}, got {}",
                kasiski::MIN_GRAM, kasiski::MAX_GRAM, analysis.kasiski_gram_length
            )));
        }
        self.hill_key()
            .map_err(|e| Error::Config(format!("hill_default_key: {}", e)))?;
        Ok(())
    }
}

/// Config storage location and operations
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at default location (~/.config/klassik/config.json).
    /// Nothing is created until [`ConfigStore::save`].
    pub fn default_location() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("klassik");

        Self {
            path: config_dir.join("config.json"),
        }
    }

    /// Store at a specific path
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load config from disk, defaults when the file is missing
    pub fn load(&self) -> Result<LabConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(LabConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let config: LabConfig = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self, config: &LabConfig) -> Result<()> {
        config.validate()?;
        let content = serde_json::to_string_pretty(config)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write to temp file first, then rename (atomic)
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)?;
        std::fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}
