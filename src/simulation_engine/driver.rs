// simulation_engine/driver.rs
use crate::error::Result;
use crate::shared_data::{Position, VehicleState};

/// The simulator control surface the broadcast loop and snapshot recorder need.
///
/// Implemented by the TraCI client for real runs and by
/// [`ScriptedSimulation`](crate::simulation_engine::scripted::ScriptedSimulation)
/// for replaying fixed vehicle frames.
#[allow(async_fn_in_trait)]
pub trait SimulationDriver {
    /// Advances the simulation by one step.
    async fn simulation_step(&mut self) -> Result<()>;

    /// Vehicles still running or waiting to be inserted.
    async fn min_expected_vehicles(&mut self) -> Result<i32>;

    /// Current simulation time in seconds.
    async fn current_time(&mut self) -> Result<f64>;

    async fn vehicle_ids(&mut self) -> Result<Vec<String>>;

    async fn position(&mut self, vehicle_id: &str) -> Result<Position>;

    async fn speed(&mut self, vehicle_id: &str) -> Result<f64>;

    async fn lane_id(&mut self, vehicle_id: &str) -> Result<String>;

    /// Air distance between two network positions.
    async fn distance_2d(&mut self, from: Position, to: Position) -> Result<f64>;

    /// Decelerates a vehicle to `speed` over `duration` seconds.
    async fn slow_down(&mut self, vehicle_id: &str, speed: f64, duration: f64) -> Result<()>;

    async fn close(&mut self) -> Result<()>;

    /// Position, speed and lane of one vehicle.
    async fn vehicle_state(&mut self, vehicle_id: &str) -> Result<VehicleState> {
        let position = self.position(vehicle_id).await?;
        let speed = self.speed(vehicle_id).await?;
        let lane = self.lane_id(vehicle_id).await?;
        Ok(VehicleState {
            id: vehicle_id.to_string(),
            position,
            speed,
            lane,
        })
    }
}
