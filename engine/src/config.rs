use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{is_yaml, Catalog};
use crate::rules::{ClassId, PROFICIENCY_BONUS};

/// Table-level knobs for a build session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub proficiency_bonus: i32,
    /// Gold-piece budget overrides, keyed by class.
    pub starting_gold: IndexMap<ClassId, u32>,
    /// Replacement for the built-in catalog.
    pub catalog_path: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            proficiency_bonus: PROFICIENCY_BONUS,
            starting_gold: IndexMap::new(),
            catalog_path: None,
        }
    }
}

impl BuildConfig {
    /// `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::parse(&text, is_yaml(path))
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn parse(text: &str, yaml: bool) -> Result<Self> {
        if yaml {
            Ok(serde_yaml::from_str(text)?)
        } else {
            Ok(serde_json::from_str(text)?)
        }
    }

    pub fn starting_gold_for(&self, class: ClassId) -> u32 {
        self.starting_gold
            .get(&class)
            .copied()
            .unwrap_or(class.rules().starting_gold)
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Catalog::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_fall_back_to_class_table() {
        let cfg = BuildConfig::parse("starting_gold:\n  Wizard: 100\n", true).unwrap();
        assert_eq!(cfg.proficiency_bonus, 2);
        assert_eq!(cfg.starting_gold_for(ClassId::Wizard), 100);
        assert_eq!(cfg.starting_gold_for(ClassId::Fighter), 155);
    }

    #[test]
    fn json_config_parses() {
        let cfg = BuildConfig::parse(r#"{"proficiency_bonus": 3}"#, false).unwrap();
        assert_eq!(cfg.proficiency_bonus, 3);
        assert!(cfg.starting_gold.is_empty());
        assert!(cfg.catalog_path.is_none());
    }
}
