use hazard_broadcast::monitoring::event_log::EventLog;
use hazard_broadcast::shared_data::{MessageType, VehicleState};
use hazard_broadcast::simulation_engine::broadcast::{
    broadcast, run_rng, BroadcastSettings, EventBroadcastLoop,
};
use hazard_broadcast::simulation_engine::driver::SimulationDriver;
use hazard_broadcast::simulation_engine::scripted::{Frame, ScriptedSimulation};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::fs;

/// Vehicles scattered over a 400x400 area, moving a little each frame.
fn moving_fleet(seed: u64, vehicles: usize, frames: usize) -> Vec<Frame> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut states: Vec<VehicleState> = (0..vehicles)
        .map(|i| {
            VehicleState::new(
                &format!("flow_0.{}", i),
                rng.random_range(0.0..400.0),
                rng.random_range(0.0..400.0),
                rng.random_range(5.0..15.0),
                &format!("E{}_0", i % 4),
            )
        })
        .collect();

    (1..=frames)
        .map(|step| {
            for state in states.iter_mut() {
                state.position.x += state.speed;
            }
            Frame::new(step as f64, states.clone())
        })
        .collect()
}

fn high_rate() -> BroadcastSettings {
    BroadcastSettings {
        event_probability: 0.2,
        ..BroadcastSettings::default()
    }
}

#[tokio::test]
async fn receivers_are_exactly_the_vehicles_in_range() {
    let frames = moving_fleet(42, 30, 1);
    let fleet = frames[0].vehicles.clone();
    let mut sim = ScriptedSimulation::new(frames);
    sim.simulation_step().await.unwrap();

    for sender in &fleet {
        let mut log = EventLog::new();
        broadcast(&mut sim, &sender.id, MessageType::SuddenStop, 100.0, &mut log)
            .await
            .unwrap();

        let received: BTreeSet<_> = log.iter().map(|r| r.receiver_vehicle.clone()).collect();
        let expected: BTreeSet<_> = fleet
            .iter()
            .filter(|other| other.id != sender.id)
            .filter(|other| sender.position.distance_to(&other.position) < 100.0)
            .map(|other| other.id.clone())
            .collect();
        assert_eq!(received, expected, "sender {}", sender.id);
        assert!(log.iter().all(|r| r.sender_vehicle == sender.id));
    }
}

#[tokio::test]
async fn same_seed_and_frames_give_same_records() {
    let mut first_sim = ScriptedSimulation::new(moving_fleet(7, 25, 40));
    let mut second_sim = ScriptedSimulation::new(moving_fleet(7, 25, 40));

    let first = EventBroadcastLoop::new(high_rate(), run_rng(Some(2024)))
        .run(&mut first_sim)
        .await
        .unwrap();
    let second = EventBroadcastLoop::new(high_rate(), run_rng(Some(2024)))
        .run(&mut second_sim)
        .await
        .unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(first_sim.slow_downs(), second_sim.slow_downs());
}

#[tokio::test]
async fn records_reference_vehicles_present_at_their_timestamp() {
    let frames = moving_fleet(99, 20, 30);
    let mut sim = ScriptedSimulation::new(frames.clone());
    let log = EventBroadcastLoop::new(high_rate(), run_rng(Some(1)))
        .run(&mut sim)
        .await
        .unwrap();

    assert!(!log.is_empty());
    for record in &log {
        let frame = frames
            .iter()
            .find(|f| f.time == record.timestamp)
            .expect("timestamp of a replayed frame");
        let present = |id: &str| frame.vehicles.iter().any(|v| v.id == id);
        assert!(present(&record.sender_vehicle));
        assert!(present(&record.receiver_vehicle));
        assert_ne!(record.sender_vehicle, record.receiver_vehicle);
    }
}

#[tokio::test]
async fn every_delivery_issues_the_matching_slow_down() {
    let mut sim = ScriptedSimulation::new(moving_fleet(3, 20, 20));
    let log = EventBroadcastLoop::new(high_rate(), run_rng(Some(8)))
        .run(&mut sim)
        .await
        .unwrap();

    assert_eq!(sim.slow_downs().len(), log.len());
    for (record, issued) in log.iter().zip(sim.slow_downs()) {
        assert_eq!(issued.vehicle_id, record.receiver_vehicle);
        assert_eq!(issued.time, record.timestamp);
        let (speed, duration) = match record.message_type {
            MessageType::Accident => (5.0, 3.0),
            MessageType::SuddenStop => (3.0, 2.0),
        };
        assert_eq!((issued.speed, issued.duration), (speed, duration));
    }
}

#[tokio::test]
async fn run_output_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event_logs.json");

    let mut sim = ScriptedSimulation::new(moving_fleet(5, 15, 25));
    let log = EventBroadcastLoop::new(high_rate(), run_rng(Some(77)))
        .run(&mut sim)
        .await
        .unwrap();
    log.write_json(&path).unwrap();

    assert_eq!(EventLog::read_json(&path).unwrap(), log);
}

#[tokio::test]
async fn zero_probability_writes_an_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("event_logs.json");

    let settings = BroadcastSettings {
        event_probability: 0.0,
        ..BroadcastSettings::default()
    };
    let mut sim = ScriptedSimulation::new(moving_fleet(5, 15, 25));
    let mut event_loop = EventBroadcastLoop::new(settings, run_rng(None));
    let log = event_loop.run(&mut sim).await.unwrap();
    log.write_json(&path).unwrap();

    assert_eq!(event_loop.ticks(), 25);
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}

#[tokio::test]
async fn loop_ends_when_no_vehicles_are_expected() {
    let mut sim = ScriptedSimulation::new(vec![
        Frame::new(1.0, vec![VehicleState::new("a", 0.0, 0.0, 1.0, "E0_0")]),
        Frame::new(2.0, vec![]),
        Frame::new(3.0, vec![VehicleState::new("b", 0.0, 0.0, 1.0, "E0_0")]),
    ]);
    let mut event_loop = EventBroadcastLoop::new(BroadcastSettings::default(), run_rng(Some(0)));
    event_loop.run(&mut sim).await.unwrap();
    assert_eq!(event_loop.ticks(), 3);
    assert_eq!(sim.steps_taken(), 3);
}
