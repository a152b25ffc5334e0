// traci/mod.rs
pub mod connection;
pub mod constants;
pub mod launcher;
pub mod storage;

pub use connection::TraciConnection;
pub use launcher::launch;
