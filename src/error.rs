// error.rs
use std::path::PathBuf;

/// Errors raised while driving the simulator or writing run output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Socket, process or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record or snapshot could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("AMQP error: {0}")]
    Amqp(#[from] amiquip::Error),

    /// The archive node could not be reached or sent an unreadable answer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(String),

    /// A content id that was never recorded for this kind of data.
    #[error("no {kind} data recorded under CID `{cid}`")]
    UnknownCid { kind: &'static str, cid: String },

    /// The simulator answered a command with a non-OK status.
    #[error("TraCI command 0x{command:02x} failed ({status}): {description}")]
    Traci {
        command: u8,
        status: &'static str,
        description: String,
    },

    /// The simulator sent bytes that do not decode as the expected answer.
    #[error("TraCI protocol error: {0}")]
    Protocol(String),

    /// The simulator process could not be started or reached.
    #[error("failed to launch simulator `{binary}`: {reason}")]
    Launch { binary: String, reason: String },

    #[error("unknown vehicle `{0}`")]
    UnknownVehicle(String),

    #[error("invalid configuration in {path:?}: {reason}")]
    Config { path: Option<PathBuf>, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
