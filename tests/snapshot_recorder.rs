use hazard_broadcast::config::{SnapshotConfig, SnapshotLayout};
use hazard_broadcast::monitoring::traffic_data::read_csv;
use hazard_broadcast::shared_data::{TrafficSnapshot, VehicleState};
use hazard_broadcast::simulation_engine::scripted::{Frame, ScriptedSimulation};
use hazard_broadcast::simulation_engine::snapshot::{collect_snapshot, SnapshotRecorder};
use hazard_broadcast::simulation_engine::driver::SimulationDriver;

use std::fs;
use std::path::PathBuf;

fn frames() -> Vec<Frame> {
    vec![
        Frame::new(
            1.0,
            vec![VehicleState::new("car_a", 5.0, 1.6, 0.0, "E0_0")],
        ),
        Frame::new(
            2.0,
            vec![
                VehicleState::new("car_a", 7.5, 1.6, 2.5, "E0_0"),
                VehicleState::new("car_b", 0.0, -1.6, 0.0, "-E0_0"),
            ],
        ),
        Frame::new(3.0, vec![]),
    ]
}

#[tokio::test]
async fn snapshot_captures_every_present_vehicle() {
    let mut sim = ScriptedSimulation::new(frames());
    sim.simulation_step().await.unwrap();
    sim.simulation_step().await.unwrap();

    let snapshot = collect_snapshot(&mut sim).await.unwrap();
    assert_eq!(snapshot.timestamp, 2.0);
    assert_eq!(snapshot.vehicles.len(), 2);
    assert_eq!(snapshot.vehicles[1].id, "car_b");
    assert_eq!(snapshot.vehicles[1].position, (0.0, -1.6));
    assert_eq!(snapshot.vehicles[1].lane, "-E0_0");
}

#[tokio::test]
async fn aggregated_layout_writes_one_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("traffic_data.json");
    let mut sim = ScriptedSimulation::new(frames());

    let recorder = SnapshotRecorder::new(3, SnapshotLayout::Aggregated, path.clone());
    let snapshots = recorder.run(&mut sim).await.unwrap();

    let written: Vec<TrafficSnapshot> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, snapshots);
    assert_eq!(written.len(), 3);
    assert!(written[2].vehicles.is_empty());
}

#[tokio::test]
async fn per_tick_layout_writes_a_file_per_step() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ticks");
    let mut sim = ScriptedSimulation::new(frames());

    SnapshotRecorder::new(2, SnapshotLayout::PerTick, out.clone())
        .run(&mut sim)
        .await
        .unwrap();

    let mut names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["traffic_data_1.0.json", "traffic_data_2.0.json"]);

    let second: TrafficSnapshot =
        serde_json::from_str(&fs::read_to_string(out.join("traffic_data_2.0.json")).unwrap())
            .unwrap();
    assert_eq!(second.vehicles.len(), 2);
}

#[tokio::test]
async fn csv_layout_writes_a_row_per_vehicle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("traffic_data.csv");
    let mut sim = ScriptedSimulation::new(frames());

    SnapshotRecorder::new(3, SnapshotLayout::Csv, path.clone())
        .run(&mut sim)
        .await
        .unwrap();

    let rows = read_csv(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].id, "car_b");
    assert_eq!(rows[2].timestamp, 2.0);
}

#[tokio::test]
async fn running_past_the_last_frame_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = ScriptedSimulation::new(frames());
    let recorder = SnapshotRecorder::new(
        4,
        SnapshotLayout::Aggregated,
        dir.path().join("traffic_data.json"),
    );
    assert!(recorder.run(&mut sim).await.is_err());
    assert!(!dir.path().join("traffic_data.json").exists());
}

#[tokio::test]
async fn oversized_step_count_fails_on_the_simulator_not_on_allocation() {
    let dir = tempfile::tempdir().unwrap();
    let mut sim = ScriptedSimulation::new(frames());
    let recorder = SnapshotRecorder::new(
        u64::MAX,
        SnapshotLayout::Aggregated,
        dir.path().join("traffic_data.json"),
    );
    assert!(recorder.run(&mut sim).await.is_err());
    assert_eq!(sim.steps_taken(), 3);
}

#[tokio::test]
async fn per_tick_default_output_is_a_directory() {
    let config = SnapshotConfig {
        steps: 1,
        layout: SnapshotLayout::PerTick,
        output: None,
    };
    assert_eq!(config.resolved_output(), PathBuf::from("."));

    let dir = tempfile::tempdir().unwrap();
    let config = SnapshotConfig {
        output: Some(dir.path().to_path_buf()),
        ..config
    };
    let mut sim = ScriptedSimulation::new(frames());
    SnapshotRecorder::from(&config).run(&mut sim).await.unwrap();
    assert!(dir.path().join("traffic_data_1.0.json").is_file());
}
