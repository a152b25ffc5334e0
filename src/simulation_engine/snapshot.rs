// simulation_engine/snapshot.rs
use crate::config::{SnapshotConfig, SnapshotLayout};
use crate::error::Result;
use crate::monitoring::traffic_data::{write_aggregated, write_csv, write_snapshot_file};
use crate::shared_data::{TrafficSnapshot, VehicleSnapshot};
use crate::simulation_engine::driver::SimulationDriver;

use log::{debug, info};
use std::path::PathBuf;

/// Reads position, speed and lane of every present vehicle.
pub async fn collect_snapshot<S: SimulationDriver>(sim: &mut S) -> Result<TrafficSnapshot> {
    let timestamp = sim.current_time().await?;
    let mut vehicles = Vec::new();
    for vehicle_id in sim.vehicle_ids().await? {
        let state = sim.vehicle_state(&vehicle_id).await?;
        vehicles.push(VehicleSnapshot::from(state));
    }
    Ok(TrafficSnapshot {
        timestamp,
        vehicles,
    })
}

/// Steps the simulation a fixed number of times, sampling the fleet after each step.
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    steps: u64,
    layout: SnapshotLayout,
    output: PathBuf,
}

impl SnapshotRecorder {
    pub fn new(steps: u64, layout: SnapshotLayout, output: PathBuf) -> Self {
        Self {
            steps,
            layout,
            output,
        }
    }

    /// Per-tick files are written as the run goes; other layouts once at the end.
    pub async fn run<S: SimulationDriver>(&self, sim: &mut S) -> Result<Vec<TrafficSnapshot>> {
        let mut snapshots = Vec::new();
        for step in 0..self.steps {
            sim.simulation_step().await?;
            let snapshot = collect_snapshot(sim).await?;
            debug!(
                "Step {} at t={}: {} vehicles",
                step,
                snapshot.timestamp,
                snapshot.vehicles.len()
            );
            if self.layout == SnapshotLayout::PerTick {
                let path = write_snapshot_file(&self.output, &snapshot)?;
                debug!("Wrote {}", path.display());
            }
            snapshots.push(snapshot);
        }

        match self.layout {
            SnapshotLayout::PerTick => {}
            SnapshotLayout::Aggregated => write_aggregated(&self.output, &snapshots)?,
            SnapshotLayout::Csv => write_csv(&self.output, &snapshots)?,
        }
        info!(
            "Recorded {} snapshots to {} ({:?}).",
            snapshots.len(),
            self.output.display(),
            self.layout
        );
        Ok(snapshots)
    }
}

impl From<&SnapshotConfig> for SnapshotRecorder {
    fn from(config: &SnapshotConfig) -> Self {
        Self::new(config.steps, config.layout, config.resolved_output())
    }
}
