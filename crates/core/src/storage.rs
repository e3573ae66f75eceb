use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::NetworkSeed;
use crate::rules::AlertRecord;
use crate::store::Network;

const NETWORKS_FILE: &str = "networks.json";
const ALERTS_FILE: &str = "alert_history.json";
const CURRENT_FILE: &str = "current_network";

/// Alert records keyed by `<network_id>/<date>`. Re-saving a date overwrites
/// its record.
pub type AlertHistory = BTreeMap<String, AlertRecord>;

pub fn alert_key(network_id: &str, date: &str) -> String {
    format!("{network_id}/{date}")
}

/// JSON-file state store over a data directory. Every call is a whole-value
/// load or replace; there is no partial-update API.
#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads all networks, seeding fresh empty ones from `seeds` when no
    /// state file exists yet.
    pub fn load_networks(
        &self,
        seeds: &[NetworkSeed],
        now: &str,
    ) -> anyhow::Result<BTreeMap<String, Network>> {
        let path = self.dir.join(NETWORKS_FILE);
        if !path.exists() {
            return Ok(seeds
                .iter()
                .map(|seed| (seed.id.clone(), Network::new(&seed.id, &seed.name, now)))
                .collect());
        }
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save_networks(&self, networks: &BTreeMap<String, Network>) -> anyhow::Result<()> {
        self.write_json(NETWORKS_FILE, networks)
    }

    pub fn load_alert_history(&self) -> anyhow::Result<AlertHistory> {
        let path = self.dir.join(ALERTS_FILE);
        if !path.exists() {
            return Ok(AlertHistory::new());
        }
        let bytes = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save_alert_history(&self, history: &AlertHistory) -> anyhow::Result<()> {
        self.write_json(ALERTS_FILE, history)
    }

    pub fn load_current_network(&self) -> anyhow::Result<Option<String>> {
        let path = self.dir.join(CURRENT_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let id = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let id = id.trim();
        Ok(if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        })
    }

    pub fn save_current_network(&self, id: &str) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create data dir {}", self.dir.display()))?;
        let path = self.dir.join(CURRENT_FILE);
        fs::write(&path, id).with_context(|| format!("write {}", path.display()))
    }

    fn write_json<T: serde::Serialize>(&self, file: &str, value: &T) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create data dir {}", self.dir.display()))?;
        let path = self.dir.join(file);
        let json = serde_json::to_vec_pretty(value).context("serialize state")?;
        fs::write(&path, json).with_context(|| format!("write {}", path.display()))
    }
}
