use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Identity of a network to seed when no saved state exists yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkSeed {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub networks: Vec<NetworkSeed>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    pub fn discover() -> Option<Self> {
        let path = Path::new("vlanwatch.toml");
        if path.exists() {
            Config::load(path).ok()
        } else {
            None
        }
    }

    /// Configured seeds, or the stock two-network layout when none are given.
    pub fn seeds(&self) -> Vec<NetworkSeed> {
        if self.networks.is_empty() {
            default_seeds()
        } else {
            self.networks.clone()
        }
    }
}

pub fn default_seeds() -> Vec<NetworkSeed> {
    vec![
        NetworkSeed {
            id: "network_1".to_string(),
            name: "R1".to_string(),
        },
        NetworkSeed {
            id: "network_2".to_string(),
            name: "R2".to_string(),
        },
    ]
}
