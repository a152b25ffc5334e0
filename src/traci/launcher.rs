// traci/launcher.rs
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::global_variables::CONNECT_RETRY_DELAY_MS;
use crate::traci::connection::TraciConnection;

use log::{debug, info};
use std::net::TcpListener;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::time::{sleep, Duration};

/// Asks the OS for an unused local port.
pub fn free_port() -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Arguments passed to the simulator binary.
pub fn simulator_args(config: &RunConfig, port: u16) -> Vec<String> {
    vec![
        "-c".to_string(),
        config.sumo_config.display().to_string(),
        "--remote-port".to_string(),
        port.to_string(),
    ]
}

/// Starts the simulator and opens a TraCI session to it.
pub async fn launch(config: &RunConfig) -> Result<TraciConnection> {
    let port = match config.port {
        Some(port) => port,
        None => free_port()?,
    };
    let binary = config.resolved_binary().to_string();
    let args = simulator_args(config, port);
    info!("Starting {} {}", binary, args.join(" "));

    let mut child = Command::new(&binary)
        .args(&args)
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::Launch {
            binary: binary.clone(),
            reason: e.to_string(),
        })?;

    let addr = format!("{}:{}", config.host, port);
    let mut attempt = 0;
    let stream = loop {
        attempt += 1;
        match TcpStream::connect(&addr).await {
            Ok(stream) => break stream,
            Err(e) => {
                if let Some(status) = child.try_wait()? {
                    return Err(Error::Launch {
                        binary,
                        reason: format!("exited with {} before accepting connections", status),
                    });
                }
                if attempt >= config.connect_retries {
                    return Err(Error::Launch {
                        binary,
                        reason: format!("no TraCI server at {} after {} attempts: {}", addr, attempt, e),
                    });
                }
                debug!("Connection attempt {} to {} failed: {}. Retrying...", attempt, addr, e);
                sleep(Duration::from_millis(CONNECT_RETRY_DELAY_MS)).await;
            }
        }
    };

    let mut connection = TraciConnection::from_stream(stream);
    connection.attach_process(child);
    let (api, version) = connection.get_version().await?;
    info!("Connected to {} at {} (TraCI API {})", version, addr, api);
    Ok(connection)
}
