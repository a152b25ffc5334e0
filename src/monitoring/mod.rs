// monitoring/mod.rs
pub mod archive;
pub mod event_log;
pub mod publisher;
pub mod report;
pub mod traffic_data;
