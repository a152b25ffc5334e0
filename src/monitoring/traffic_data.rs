// monitoring/traffic_data.rs
//
// Writers for fleet snapshots.

use crate::error::Result;
use crate::monitoring::event_log::write_pretty_json;
use crate::shared_data::TrafficSnapshot;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One vehicle at one tick, flattened for CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub timestamp: f64,
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub lane: String,
}

/// File name of a per-tick snapshot, e.g. `traffic_data_12.0.json`.
pub fn snapshot_file_name(timestamp: f64) -> String {
    format!("traffic_data_{:?}.json", timestamp)
}

/// Writes one snapshot into `dir` and returns the file path.
pub fn write_snapshot_file(dir: &Path, snapshot: &TrafficSnapshot) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(snapshot_file_name(snapshot.timestamp));
    write_pretty_json(&path, snapshot)?;
    Ok(path)
}

pub fn write_aggregated(path: &Path, snapshots: &[TrafficSnapshot]) -> Result<()> {
    write_pretty_json(path, &snapshots)
}

pub fn snapshot_rows(snapshots: &[TrafficSnapshot]) -> Vec<SnapshotRow> {
    snapshots
        .iter()
        .flat_map(|snapshot| {
            snapshot.vehicles.iter().map(move |vehicle| SnapshotRow {
                timestamp: snapshot.timestamp,
                id: vehicle.id.clone(),
                x: vehicle.position.0,
                y: vehicle.position.1,
                speed: vehicle.speed,
                lane: vehicle.lane.clone(),
            })
        })
        .collect()
}

/// Writes every vehicle of every snapshot as one CSV row, with a header.
pub fn write_csv(path: &Path, snapshots: &[TrafficSnapshot]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in snapshot_rows(snapshots) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<SnapshotRow>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
