// config.rs
//
// Run settings. Every binary takes an optional JSON file path as its first
// argument; missing keys fall back to the defaults in `global_variables`.

use crate::error::{Error, Result};
use crate::global_variables::{
    ARCHIVE_API_URL, BROADCAST_RANGE, CID_LEDGER_FILE, CONNECT_RETRIES, EVENT_LOG_FILE,
    EVENT_PROBABILITY, MAX_SNAPSHOT_STEPS, QUEUE_HAZARD_EVENTS, SNAPSHOT_STEPS, SUMO_BINARY,
    SUMO_CONFIG, SUMO_GUI_BINARY, TRACI_HOST, TRAFFIC_DATA_CSV_FILE, TRAFFIC_DATA_FILE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Explicit simulator binary; when unset `gui` picks `sumo-gui` or `sumo`.
    pub sumo_binary: Option<String>,
    pub sumo_config: PathBuf,
    pub gui: bool,
    pub host: String,
    /// TraCI port; a free local port is chosen when unset.
    pub port: Option<u16>,
    pub connect_retries: u32,
    /// Upper bound on broadcast-loop ticks.
    pub step_budget: Option<u64>,
    pub seed: Option<u64>,
    pub event_probability: f64,
    pub broadcast_range: f64,
    pub output_path: PathBuf,
    pub verify_output: bool,
    pub snapshot: SnapshotConfig,
    pub publish: PublishConfig,
    pub archive: ArchiveConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sumo_binary: None,
            sumo_config: PathBuf::from(SUMO_CONFIG),
            gui: false,
            host: TRACI_HOST.to_string(),
            port: None,
            connect_retries: CONNECT_RETRIES,
            step_budget: None,
            seed: None,
            event_probability: EVENT_PROBABILITY,
            broadcast_range: BROADCAST_RANGE,
            output_path: PathBuf::from(EVENT_LOG_FILE),
            verify_output: true,
            snapshot: SnapshotConfig::default(),
            publish: PublishConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

/// How the snapshot variant lays out its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotLayout {
    /// One JSON array holding every tick.
    Aggregated,
    /// One `traffic_data_<timestamp>.json` per tick inside `output`.
    PerTick,
    /// One CSV row per vehicle per tick.
    Csv,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    pub steps: u64,
    pub layout: SnapshotLayout,
    /// File for `aggregated` and `csv`, directory for `per_tick`.
    /// Defaults depend on the layout, see [`SnapshotConfig::resolved_output`].
    pub output: Option<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            steps: SNAPSHOT_STEPS,
            layout: SnapshotLayout::Aggregated,
            output: None,
        }
    }
}

impl SnapshotConfig {
    pub fn resolved_output(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        match self.layout {
            SnapshotLayout::Aggregated => PathBuf::from(TRAFFIC_DATA_FILE),
            SnapshotLayout::PerTick => PathBuf::from("."),
            SnapshotLayout::Csv => PathBuf::from(TRAFFIC_DATA_CSV_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Publishing is off unless a broker URL is given.
    pub amqp_url: Option<String>,
    pub queue: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            amqp_url: None,
            queue: QUEUE_HAZARD_EVENTS.to_string(),
        }
    }
}

/// Content-addressed archiving of run output through an IPFS HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    pub enabled: bool,
    pub api_url: String,
    /// JSON file mapping `traffic` / `accident` to the stored content ids.
    pub ledger: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: ARCHIVE_API_URL.to_string(),
            ledger: PathBuf::from(CID_LEDGER_FILE),
        }
    }
}

impl RunConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: RunConfig = serde_json::from_str(&raw).map_err(|e| Error::Config {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        })?;
        config.validate(Some(path))?;
        Ok(config)
    }

    /// Uses the first command-line argument as config path, defaults otherwise.
    pub fn from_args() -> Result<Self> {
        match std::env::args().nth(1) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                let config = Self::default();
                config.validate(None)?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self, path: Option<&Path>) -> Result<()> {
        let invalid = |reason: String| Error::Config {
            path: path.map(Path::to_path_buf),
            reason,
        };
        if !(0.0..=1.0).contains(&self.event_probability) {
            return Err(invalid(format!(
                "event_probability must be within [0, 1], got {}",
                self.event_probability
            )));
        }
        if !self.broadcast_range.is_finite() || self.broadcast_range <= 0.0 {
            return Err(invalid(format!(
                "broadcast_range must be positive, got {}",
                self.broadcast_range
            )));
        }
        if self.connect_retries == 0 {
            return Err(invalid("connect_retries must be at least 1".to_string()));
        }
        if self.snapshot.steps > MAX_SNAPSHOT_STEPS {
            return Err(invalid(format!(
                "snapshot.steps must be at most {}, got {}",
                MAX_SNAPSHOT_STEPS, self.snapshot.steps
            )));
        }
        if self.archive.enabled && self.archive.api_url.trim().is_empty() {
            return Err(invalid("archive.api_url must be set when archiving".to_string()));
        }
        Ok(())
    }

    /// The simulator executable to launch.
    pub fn resolved_binary(&self) -> &str {
        match &self.sumo_binary {
            Some(binary) => binary.as_str(),
            None if self.gui => SUMO_GUI_BINARY,
            None => SUMO_BINARY,
        }
    }
}
