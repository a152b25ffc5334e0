// simulation_engine/broadcast.rs
use crate::config::RunConfig;
use crate::error::Result;
use crate::global_variables::{BROADCAST_RANGE, EVENT_PROBABILITY};
use crate::monitoring::event_log::EventLog;
use crate::shared_data::{EventRecord, MessageType};
use crate::simulation_engine::driver::SimulationDriver;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tunables of the broadcast loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BroadcastSettings {
    /// Chance per vehicle and tick of a hazard being raised.
    pub event_probability: f64,
    /// Receivers must be strictly closer than this.
    pub broadcast_range: f64,
    pub step_budget: Option<u64>,
}

impl Default for BroadcastSettings {
    fn default() -> Self {
        Self {
            event_probability: EVENT_PROBABILITY,
            broadcast_range: BROADCAST_RANGE,
            step_budget: None,
        }
    }
}

impl From<&RunConfig> for BroadcastSettings {
    fn from(config: &RunConfig) -> Self {
        Self {
            event_probability: config.event_probability,
            broadcast_range: config.broadcast_range,
            step_budget: config.step_budget,
        }
    }
}

/// Seeded when a seed is given, otherwise from OS entropy.
pub fn run_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub vehicles: usize,
    pub broadcasts: usize,
    pub deliveries: usize,
}

/// Drives the simulator tick by tick, raising random hazards and
/// broadcasting them to vehicles in range.
pub struct EventBroadcastLoop<R> {
    settings: BroadcastSettings,
    rng: R,
    ticks: u64,
}

impl<R: Rng> EventBroadcastLoop<R> {
    pub fn new(settings: BroadcastSettings, rng: R) -> Self {
        Self {
            settings,
            rng,
            ticks: 0,
        }
    }

    pub fn settings(&self) -> &BroadcastSettings {
        &self.settings
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs until no vehicles are expected or the step budget is spent.
    pub async fn run<S: SimulationDriver>(&mut self, sim: &mut S) -> Result<EventLog> {
        let mut log = EventLog::new();
        while sim.min_expected_vehicles().await? > 0 {
            if let Some(budget) = self.settings.step_budget {
                if self.ticks >= budget {
                    info!("Step budget of {} reached.", budget);
                    break;
                }
            }
            self.tick(sim, &mut log).await?;
        }
        info!(
            "Broadcast loop finished after {} ticks with {} events.",
            self.ticks,
            log.len()
        );
        Ok(log)
    }

    /// Advances one step and lets every present vehicle roll for a hazard.
    pub async fn tick<S: SimulationDriver>(
        &mut self,
        sim: &mut S,
        log: &mut EventLog,
    ) -> Result<TickOutcome> {
        sim.simulation_step().await?;
        self.ticks += 1;

        let vehicle_ids = sim.vehicle_ids().await?;
        let mut outcome = TickOutcome {
            vehicles: vehicle_ids.len(),
            ..TickOutcome::default()
        };
        for vehicle_id in &vehicle_ids {
            if let Some(message_type) = self.draw_event() {
                info!(
                    "Vehicle {} experienced a {}. Broadcasting...",
                    vehicle_id, message_type
                );
                outcome.broadcasts += 1;
                outcome.deliveries += broadcast(
                    sim,
                    vehicle_id,
                    message_type,
                    self.settings.broadcast_range,
                    log,
                )
                .await?;
            }
        }
        debug!("Tick {}: {:?}", self.ticks, outcome);
        Ok(outcome)
    }

    /// Uniform draw against the trigger probability, then a fair pick of the message type.
    fn draw_event(&mut self) -> Option<MessageType> {
        if self.rng.random::<f64>() >= self.settings.event_probability {
            return None;
        }
        let message_type = if self.rng.random_bool(0.5) {
            MessageType::Accident
        } else {
            MessageType::SuddenStop
        };
        Some(message_type)
    }
}

/// Sends `message_type` from `sender` to every other present vehicle closer
/// than `range`. Returns the number of receivers.
pub async fn broadcast<S: SimulationDriver>(
    sim: &mut S,
    sender: &str,
    message_type: MessageType,
    range: f64,
    log: &mut EventLog,
) -> Result<usize> {
    let sender_position = sim.position(sender).await?;
    let vehicle_ids = sim.vehicle_ids().await?;
    let timestamp = sim.current_time().await?;

    let mut delivered = 0;
    for receiver in vehicle_ids.iter().filter(|id| id.as_str() != sender) {
        let receiver_position = sim.position(receiver).await?;
        let distance = sim.distance_2d(sender_position, receiver_position).await?;
        if distance < range {
            deliver(sim, receiver, sender, message_type, timestamp, log).await?;
            delivered += 1;
        }
    }
    Ok(delivered)
}

/// Applies the message's slow-down to `receiver` and records the event.
pub async fn deliver<S: SimulationDriver>(
    sim: &mut S,
    receiver: &str,
    sender: &str,
    message_type: MessageType,
    timestamp: f64,
    log: &mut EventLog,
) -> Result<()> {
    let slow_down = message_type.slow_down();
    info!(
        "Vehicle {} received {} info from {}. Slowing down.",
        receiver, message_type, sender
    );
    sim.slow_down(receiver, slow_down.speed, slow_down.duration)
        .await?;
    log.push(EventRecord {
        receiver_vehicle: receiver.to_string(),
        sender_vehicle: sender.to_string(),
        message_type,
        timestamp,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::VehicleState;
    use crate::simulation_engine::scripted::ScriptedSimulation;

    fn fleet() -> Vec<VehicleState> {
        vec![
            VehicleState::new("sender", 0.0, 0.0, 13.0, "e0_0"),
            VehicleState::new("near", 30.0, 40.0, 12.0, "e0_1"),
            VehicleState::new("edge", 100.0, 0.0, 11.0, "e1_0"),
            VehicleState::new("far", 300.0, 0.0, 10.0, "e2_0"),
        ]
    }

    #[tokio::test]
    async fn broadcast_reaches_only_vehicles_strictly_in_range() {
        let mut sim = ScriptedSimulation::repeating(fleet(), 1);
        sim.simulation_step().await.unwrap();
        let mut log = EventLog::new();

        let delivered = broadcast(&mut sim, "sender", MessageType::Accident, 100.0, &mut log)
            .await
            .unwrap();

        assert_eq!(delivered, 1);
        assert_eq!(
            log.records(),
            &[EventRecord {
                receiver_vehicle: "near".to_string(),
                sender_vehicle: "sender".to_string(),
                message_type: MessageType::Accident,
                timestamp: 1.0,
            }]
        );
        assert_eq!(sim.slow_downs().len(), 1);
        assert_eq!(sim.slow_downs()[0].vehicle_id, "near");
        assert_eq!(sim.slow_downs()[0].speed, 5.0);
        assert_eq!(sim.slow_downs()[0].duration, 3.0);
    }

    #[tokio::test]
    async fn sudden_stop_uses_gentler_slow_down() {
        let mut sim = ScriptedSimulation::repeating(fleet(), 1);
        sim.simulation_step().await.unwrap();
        let mut log = EventLog::new();

        broadcast(&mut sim, "near", MessageType::SuddenStop, 100.0, &mut log)
            .await
            .unwrap();

        let receivers: Vec<_> = log
            .records()
            .iter()
            .map(|r| r.receiver_vehicle.as_str())
            .collect();
        assert_eq!(receivers, vec!["sender", "edge"]);
        for issued in sim.slow_downs() {
            assert_eq!((issued.speed, issued.duration), (3.0, 2.0));
        }
    }

    #[tokio::test]
    async fn zero_probability_never_triggers() {
        let mut sim = ScriptedSimulation::repeating(fleet(), 50);
        let settings = BroadcastSettings {
            event_probability: 0.0,
            ..BroadcastSettings::default()
        };
        let mut event_loop = EventBroadcastLoop::new(settings, run_rng(Some(1)));
        let log = event_loop.run(&mut sim).await.unwrap();
        assert!(log.is_empty());
        assert_eq!(event_loop.ticks(), 50);
        assert!(sim.slow_downs().is_empty());
    }

    #[tokio::test]
    async fn certain_trigger_broadcasts_from_every_vehicle() {
        let mut sim = ScriptedSimulation::repeating(fleet(), 1);
        let settings = BroadcastSettings {
            event_probability: 1.0,
            ..BroadcastSettings::default()
        };
        let mut event_loop = EventBroadcastLoop::new(settings, run_rng(Some(3)));
        let mut log = EventLog::new();
        let outcome = event_loop.tick(&mut sim, &mut log).await.unwrap();

        // sender<->near and near<->edge are the only pairs in range; sender<->edge sits exactly on it.
        assert_eq!(outcome.vehicles, 4);
        assert_eq!(outcome.broadcasts, 4);
        assert_eq!(outcome.deliveries, 4);
        assert_eq!(log.len(), 4);
    }

    #[tokio::test]
    async fn step_budget_stops_the_loop() {
        let mut sim = ScriptedSimulation::repeating(fleet(), 20);
        let settings = BroadcastSettings {
            step_budget: Some(5),
            ..BroadcastSettings::default()
        };
        let mut event_loop = EventBroadcastLoop::new(settings, run_rng(Some(9)));
        event_loop.run(&mut sim).await.unwrap();
        assert_eq!(event_loop.ticks(), 5);
        assert_eq!(sim.steps_taken(), 5);
    }
}
