//! Hazard broadcast emulation on top of the SUMO traffic simulator.
//!
//! Each simulation step a small share of vehicles raise an `accident` or
//! `sudden_stop` hazard; every other vehicle within the broadcast range slows
//! down and the delivery is logged. A second mode samples the whole fleet
//! every step for a fixed number of steps.

pub mod config;
pub mod error;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;
pub mod traci;

pub use error::{Error, Result};
