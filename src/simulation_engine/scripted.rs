// simulation_engine/scripted.rs
//
// In-memory driver that replays a fixed list of frames, one per step.

use crate::error::{Error, Result};
use crate::shared_data::{Position, VehicleState};
use crate::simulation_engine::driver::SimulationDriver;

/// The fleet as it looks after one simulation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub vehicles: Vec<VehicleState>,
}

impl Frame {
    pub fn new(time: f64, vehicles: Vec<VehicleState>) -> Self {
        Self { time, vehicles }
    }
}

/// A slow-down command as received by the scripted driver.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedSlowDown {
    pub vehicle_id: String,
    pub speed: f64,
    pub duration: f64,
    pub time: f64,
}

/// Deterministic stand-in for the simulator, used by the tests and benches.
/// No binary runs on it; real runs always go through TraCI.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSimulation {
    frames: Vec<Frame>,
    /// Index of the frame shown after the last step, `None` before the first.
    current: Option<usize>,
    slow_downs: Vec<IssuedSlowDown>,
    closed: bool,
}

impl ScriptedSimulation {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Repeats one fleet layout for `steps` steps of one second each.
    pub fn repeating(vehicles: Vec<VehicleState>, steps: usize) -> Self {
        let frames = (1..=steps)
            .map(|step| Frame::new(step as f64, vehicles.clone()))
            .collect();
        Self::new(frames)
    }

    pub fn slow_downs(&self) -> &[IssuedSlowDown] {
        &self.slow_downs
    }

    pub fn steps_taken(&self) -> usize {
        self.current.map_or(0, |index| index + 1)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn frame(&self) -> Option<&Frame> {
        self.current.and_then(|index| self.frames.get(index))
    }

    fn vehicle(&self, vehicle_id: &str) -> Result<&VehicleState> {
        self.frame()
            .and_then(|frame| frame.vehicles.iter().find(|v| v.id == vehicle_id))
            .ok_or_else(|| Error::UnknownVehicle(vehicle_id.to_string()))
    }
}

impl SimulationDriver for ScriptedSimulation {
    async fn simulation_step(&mut self) -> Result<()> {
        let next = self.current.map_or(0, |index| index + 1);
        if next >= self.frames.len() {
            return Err(Error::Protocol(format!(
                "scripted simulation has only {} frames",
                self.frames.len()
            )));
        }
        self.current = Some(next);
        Ok(())
    }

    async fn min_expected_vehicles(&mut self) -> Result<i32> {
        let next = self.current.map_or(0, |index| index + 1);
        // Any remaining frame keeps the run alive, even an empty one.
        Ok(match self.frames.get(next) {
            Some(frame) => frame.vehicles.len().max(1) as i32,
            None => 0,
        })
    }

    async fn current_time(&mut self) -> Result<f64> {
        Ok(self.frame().map_or(0.0, |frame| frame.time))
    }

    async fn vehicle_ids(&mut self) -> Result<Vec<String>> {
        Ok(self
            .frame()
            .map(|frame| frame.vehicles.iter().map(|v| v.id.clone()).collect())
            .unwrap_or_default())
    }

    async fn position(&mut self, vehicle_id: &str) -> Result<Position> {
        Ok(self.vehicle(vehicle_id)?.position)
    }

    async fn speed(&mut self, vehicle_id: &str) -> Result<f64> {
        Ok(self.vehicle(vehicle_id)?.speed)
    }

    async fn lane_id(&mut self, vehicle_id: &str) -> Result<String> {
        Ok(self.vehicle(vehicle_id)?.lane.clone())
    }

    async fn distance_2d(&mut self, from: Position, to: Position) -> Result<f64> {
        Ok(from.distance_to(&to))
    }

    async fn slow_down(&mut self, vehicle_id: &str, speed: f64, duration: f64) -> Result<()> {
        self.vehicle(vehicle_id)?;
        let time = self.frame().map_or(0.0, |frame| frame.time);
        self.slow_downs.push(IssuedSlowDown {
            vehicle_id: vehicle_id.to_string(),
            speed,
            duration,
            time,
        });
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
