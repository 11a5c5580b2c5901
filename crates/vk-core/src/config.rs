//! Configuration for a Vaultkeeper installation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vk_combat::CombatConfig;
use vk_rules::{RuleData, RulesConfig, data::preset};

use crate::error::{CoreError, CoreResult};

/// Top-level configuration, read from a TOML file.
///
/// ```toml
/// store_path = "vault.json"
///
/// [rules]
/// base_tag_slots = 3
///
/// [combat]
/// max_group_ap = 6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Build rule constants.
    pub rules: RulesConfig,
    /// Combat defaults.
    pub combat: CombatConfig,
    /// Reference data file (`.json` or `.toml`). The built-in preset is
    /// used when unset.
    pub data_path: Option<PathBuf>,
    /// JSON store file.
    pub store_path: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            combat: CombatConfig::default(),
            data_path: None,
            store_path: PathBuf::from("vault.json"),
        }
    }
}

impl VaultConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(source: &str) -> CoreResult<Self> {
        toml::from_str(source).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Load a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file missing, using defaults");
            return Ok(Self::default());
        }
        let source = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&source)
    }

    /// Resolve the reference data this config points at.
    pub fn rule_data(&self) -> CoreResult<RuleData> {
        match &self.data_path {
            Some(path) => Ok(RuleData::load(path)?),
            None => Ok(preset::core()),
        }
    }

    /// Set the rule constants.
    pub fn with_rules(mut self, rules: RulesConfig) -> Self {
        self.rules = rules;
        self
    }

    /// Set the combat defaults.
    pub fn with_combat(mut self, combat: CombatConfig) -> Self {
        self.combat = combat;
        self
    }

    /// Load reference data from a file instead of the preset.
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// Set the store file.
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}
