// src/shared_data.rs

use crate::global_variables::{ACCIDENT_SLOW_DOWN, SUDDEN_STOP_SLOW_DOWN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A planar position in simulator network coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance, the same measure as the simulator's air distance.
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Per-tick view of one vehicle as reported by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub id: String,
    pub position: Position,
    pub speed: f64,
    pub lane: String,
}

impl VehicleState {
    pub fn new(id: &str, x: f64, y: f64, speed: f64, lane: &str) -> Self {
        Self {
            id: id.to_string(),
            position: Position::new(x, y),
            speed,
            lane: lane.to_string(),
        }
    }
}

/// Hazard notifications a vehicle can broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Accident,
    SuddenStop,
}

impl MessageType {
    /// The deceleration a receiver applies for this message.
    pub fn slow_down(self) -> SlowDown {
        let (speed, duration) = match self {
            MessageType::Accident => ACCIDENT_SLOW_DOWN,
            MessageType::SuddenStop => SUDDEN_STOP_SLOW_DOWN,
        };
        SlowDown { speed, duration }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Accident => "accident",
            MessageType::SuddenStop => "sudden_stop",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target speed and the time (seconds) over which it is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlowDown {
    pub speed: f64,
    pub duration: f64,
}

/// One vehicle receiving one hazard message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub receiver_vehicle: String,
    pub sender_vehicle: String,
    pub message_type: MessageType,
    /// Simulation time in seconds.
    pub timestamp: f64,
}

/// Vehicle entry of a fleet snapshot. Position is written as `[x, y]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub position: (f64, f64),
    pub speed: f64,
    pub lane: String,
}

impl From<VehicleState> for VehicleSnapshot {
    fn from(state: VehicleState) -> Self {
        Self {
            id: state.id,
            position: (state.position.x, state.position.y),
            speed: state.speed,
            lane: state.lane,
        }
    }
}

/// Full-fleet state at one simulation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub timestamp: f64,
    pub vehicles: Vec<VehicleSnapshot>,
}
