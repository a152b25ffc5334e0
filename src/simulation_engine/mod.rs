// simulation_engine/mod.rs
pub mod broadcast;
pub mod driver;
pub mod scripted;
pub mod snapshot;
