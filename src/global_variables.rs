// Broadcast defaults
pub const BROADCAST_RANGE: f64 = 100.0;
pub const EVENT_PROBABILITY: f64 = 0.01;

// Slow-down commands as (target speed, duration in seconds)
pub const ACCIDENT_SLOW_DOWN: (f64, f64) = (5.0, 3.0);
pub const SUDDEN_STOP_SLOW_DOWN: (f64, f64) = (3.0, 2.0);

// Simulator
pub const SUMO_BINARY: &str = "sumo";
pub const SUMO_GUI_BINARY: &str = "sumo-gui";
pub const SUMO_CONFIG: &str = "Configuration.sumo.cfg";
pub const TRACI_HOST: &str = "127.0.0.1";
pub const CONNECT_RETRIES: u32 = 60;
pub const CONNECT_RETRY_DELAY_MS: u64 = 250;

// Output files
pub const EVENT_LOG_FILE: &str = "event_logs.json";
pub const TRAFFIC_DATA_FILE: &str = "traffic_data.json";
pub const TRAFFIC_DATA_CSV_FILE: &str = "traffic_data.csv";
pub const EVENT_TIMELINE_CHART: &str = "event_timeline.png";
pub const SNAPSHOT_STEPS: u64 = 100;
pub const MAX_SNAPSHOT_STEPS: u64 = 1_000_000;

// Archive (IPFS HTTP API)
pub const ARCHIVE_API_URL: &str = "http://127.0.0.1:5001";
pub const CID_LEDGER_FILE: &str = "cids.json";

// Queue Routing Keys
pub const QUEUE_HAZARD_EVENTS: &str = "hazard_events";
pub const QUEUE_TRAFFIC_DATA: &str = "traffic_data";
