// event_report_main.rs
use hazard_broadcast::global_variables::{EVENT_LOG_FILE, EVENT_TIMELINE_CHART};
use hazard_broadcast::monitoring::event_log::EventLog;
use hazard_broadcast::monitoring::report::{render_timeline, summarize};
use std::error::Error;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::init();
    let log_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(EVENT_LOG_FILE));
    if let Err(e) = report(&log_path) {
        eprintln!("Report error: {}", e);
        std::process::exit(1);
    }
}

fn report(log_path: &Path) -> Result<(), Box<dyn Error>> {
    println!("Generating report for '{}'...", log_path.display());
    let log = EventLog::read_json(log_path)?;
    println!("{}", summarize(&log));

    if log.is_empty() {
        println!("No events recorded, skipping chart.");
        return Ok(());
    }
    render_timeline(&log, Path::new(EVENT_TIMELINE_CHART))?;
    println!("Event timeline saved to {}", EVENT_TIMELINE_CHART);
    Ok(())
}
