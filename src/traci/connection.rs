// traci/connection.rs
use crate::error::{Error, Result};
use crate::shared_data::Position;
use crate::simulation_engine::driver::SimulationDriver;
use crate::traci::constants::*;
use crate::traci::storage::{frame_command, frame_message, Storage, StorageReader};

use bytes::{Bytes, BytesMut};
use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::process::Child;

/// A TraCI client session, optionally owning the simulator process it talks to.
#[derive(Debug)]
pub struct TraciConnection {
    stream: TcpStream,
    process: Option<Child>,
}

impl TraciConnection {
    /// Single connection attempt to an already listening simulator.
    pub async fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::from_stream(stream))
    }

    pub fn from_stream(stream: TcpStream) -> Self {
        // Each command waits for its answer, so Nagle only adds latency.
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Could not disable Nagle on the TraCI socket: {}", e);
        }
        Self {
            stream,
            process: None,
        }
    }

    /// Ties the simulator process lifetime to this session; `close` waits for it.
    pub fn attach_process(&mut self, child: Child) {
        self.process = Some(child);
    }

    /// Sends one command and returns the response bytes following its status block.
    async fn send_command(&mut self, command: u8, payload: &[u8]) -> Result<Bytes> {
        let message = frame_message(&frame_command(command, payload));
        self.stream.write_all(&message).await?;

        let total = self.stream.read_i32().await?;
        if total < 4 {
            return Err(Error::Protocol(format!("bad message length {}", total)));
        }
        let mut body = BytesMut::zeroed(total as usize - 4);
        self.stream.read_exact(&mut body).await?;

        let mut reader = StorageReader::new(body.freeze());
        check_status(command, &mut reader)?;
        Ok(reader.into_remaining())
    }

    /// Runs a GET command and returns the bytes starting at the value's type tag.
    async fn get_variable(
        &mut self,
        command: u8,
        response: u8,
        variable: u8,
        object_id: &str,
        params: &[u8],
    ) -> Result<Bytes> {
        let mut payload = Storage::new();
        payload.write_u8(variable).write_string(object_id).extend(params);
        let body = self.send_command(command, payload.as_bytes()).await?;

        let mut reader = StorageReader::new(body);
        reader.read_command_length()?;
        let response_id = reader.read_u8()?;
        let variable_id = reader.read_u8()?;
        let answered_for = reader.read_string()?;
        if response_id != response || variable_id != variable || answered_for != object_id {
            return Err(Error::Protocol(format!(
                "response 0x{:02x}/0x{:02x} for `{}` does not match request 0x{:02x}/0x{:02x} for `{}`",
                response_id, variable_id, answered_for, command, variable, object_id
            )));
        }
        Ok(reader.into_remaining())
    }

    async fn get_vehicle_variable(&mut self, variable: u8, vehicle_id: &str) -> Result<Bytes> {
        self.get_variable(
            CMD_GET_VEHICLE_VARIABLE,
            RESPONSE_GET_VEHICLE_VARIABLE,
            variable,
            vehicle_id,
            &[],
        )
        .await
    }

    async fn get_sim_variable(&mut self, variable: u8, params: &[u8]) -> Result<Bytes> {
        self.get_variable(
            CMD_GET_SIM_VARIABLE,
            RESPONSE_GET_SIM_VARIABLE,
            variable,
            "",
            params,
        )
        .await
    }

    /// API level and version string reported by the simulator.
    pub async fn get_version(&mut self) -> Result<(i32, String)> {
        let body = self.send_command(CMD_GETVERSION, &[]).await?;
        let mut reader = StorageReader::new(body);
        reader.read_command_length()?;
        let id = reader.read_u8()?;
        if id != CMD_GETVERSION {
            return Err(Error::Protocol(format!(
                "expected version response, got 0x{:02x}",
                id
            )));
        }
        let api = reader.read_i32()?;
        let version = reader.read_string()?;
        Ok((api, version))
    }
}

/// Consumes the status block at the reader's position; non-OK results become errors.
fn check_status(command: u8, reader: &mut StorageReader) -> Result<()> {
    reader.read_command_length()?;
    let answered = reader.read_u8()?;
    let result = reader.read_u8()?;
    let description = reader.read_string()?;
    if answered != command {
        return Err(Error::Protocol(format!(
            "status for command 0x{:02x}, expected 0x{:02x}",
            answered, command
        )));
    }
    let status = match result {
        RTYPE_OK => return Ok(()),
        RTYPE_NOTIMPLEMENTED => "not implemented",
        RTYPE_ERR => "error",
        _ => "unknown status",
    };
    Err(Error::Traci {
        command,
        status,
        description,
    })
}

impl SimulationDriver for TraciConnection {
    async fn simulation_step(&mut self) -> Result<()> {
        let mut payload = Storage::new();
        payload.write_f64(0.0);
        // The remaining bytes hold subscription results, which are never requested.
        self.send_command(CMD_SIMSTEP, payload.as_bytes()).await?;
        Ok(())
    }

    async fn min_expected_vehicles(&mut self) -> Result<i32> {
        let body = self.get_sim_variable(VAR_MIN_EXPECTED_VEHICLES, &[]).await?;
        StorageReader::new(body).read_typed_i32()
    }

    async fn current_time(&mut self) -> Result<f64> {
        let body = self.get_sim_variable(VAR_TIME, &[]).await?;
        StorageReader::new(body).read_typed_f64()
    }

    async fn vehicle_ids(&mut self) -> Result<Vec<String>> {
        let body = self.get_vehicle_variable(TRACI_ID_LIST, "").await?;
        StorageReader::new(body).read_typed_string_list()
    }

    async fn position(&mut self, vehicle_id: &str) -> Result<Position> {
        let body = self.get_vehicle_variable(VAR_POSITION, vehicle_id).await?;
        StorageReader::new(body).read_typed_position_2d()
    }

    async fn speed(&mut self, vehicle_id: &str) -> Result<f64> {
        let body = self.get_vehicle_variable(VAR_SPEED, vehicle_id).await?;
        StorageReader::new(body).read_typed_f64()
    }

    async fn lane_id(&mut self, vehicle_id: &str) -> Result<String> {
        let body = self.get_vehicle_variable(VAR_LANE_ID, vehicle_id).await?;
        StorageReader::new(body).read_typed_string()
    }

    async fn distance_2d(&mut self, from: Position, to: Position) -> Result<f64> {
        let mut params = Storage::new();
        params
            .write_compound_header(3)
            .write_position_2d(from)
            .write_position_2d(to)
            .write_u8(REQUEST_AIRDIST);
        let body = self
            .get_sim_variable(DISTANCE_REQUEST, params.as_bytes())
            .await?;
        StorageReader::new(body).read_typed_f64()
    }

    async fn slow_down(&mut self, vehicle_id: &str, speed: f64, duration: f64) -> Result<()> {
        let mut payload = Storage::new();
        payload
            .write_u8(CMD_SLOWDOWN)
            .write_string(vehicle_id)
            .write_compound_header(2)
            .write_typed_f64(speed)
            .write_typed_f64(duration);
        self.send_command(CMD_SET_VEHICLE_VARIABLE, payload.as_bytes())
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.send_command(CMD_CLOSE, &[]).await?;
        if let Some(mut child) = self.process.take() {
            let status = child.wait().await?;
            info!("Simulator exited with {}", status);
        } else {
            debug!("Closed TraCI session");
        }
        Ok(())
    }
}
