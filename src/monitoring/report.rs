// monitoring/report.rs
use crate::monitoring::event_log::EventLog;
use crate::shared_data::{EventRecord, MessageType};

use plotters::prelude::*;
use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub total: usize,
    pub accidents: usize,
    pub sudden_stops: usize,
    pub distinct_senders: usize,
    pub distinct_receivers: usize,
    /// Simulation time span covered by the log, if any.
    pub time_span: Option<(f64, f64)>,
}

pub fn summarize(log: &EventLog) -> EventSummary {
    let senders: HashSet<&str> = log.iter().map(|r| r.sender_vehicle.as_str()).collect();
    let receivers: HashSet<&str> = log.iter().map(|r| r.receiver_vehicle.as_str()).collect();
    let time_span = log.iter().fold(None, |span, r| match span {
        None => Some((r.timestamp, r.timestamp)),
        Some((lo, hi)) => Some((f64::min(lo, r.timestamp), f64::max(hi, r.timestamp))),
    });
    EventSummary {
        total: log.len(),
        accidents: log.count_of(MessageType::Accident),
        sudden_stops: log.count_of(MessageType::SuddenStop),
        distinct_senders: senders.len(),
        distinct_receivers: receivers.len(),
        time_span,
    }
}

impl fmt::Display for EventSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Event Summary:")?;
        writeln!(f, "Total deliveries: {}", self.total)?;
        writeln!(f, "Accident messages: {}", self.accidents)?;
        writeln!(f, "Sudden stop messages: {}", self.sudden_stops)?;
        writeln!(f, "Distinct senders: {}", self.distinct_senders)?;
        writeln!(f, "Distinct receivers: {}", self.distinct_receivers)?;
        match self.time_span {
            Some((first, last)) => write!(f, "Simulation time: {:.2}s to {:.2}s", first, last),
            None => write!(f, "Simulation time: no events"),
        }
    }
}

/// Deliveries of one message type grouped by timestamp, in log order.
pub fn deliveries_per_time(records: &[EventRecord], message_type: MessageType) -> Vec<(f64, usize)> {
    let mut points: Vec<(f64, usize)> = Vec::new();
    for record in records.iter().filter(|r| r.message_type == message_type) {
        match points.last_mut() {
            Some(last) if last.0 == record.timestamp => last.1 += 1,
            _ => points.push((record.timestamp, 1)),
        }
    }
    points
}

/// Scatter plot of deliveries per simulation time, one series per message type.
pub fn render_timeline(log: &EventLog, path: &Path) -> Result<(), Box<dyn Error>> {
    let accidents = deliveries_per_time(log.records(), MessageType::Accident);
    let sudden_stops = deliveries_per_time(log.records(), MessageType::SuddenStop);

    let summary = summarize(log);
    let (min_ts, mut max_ts) = summary.time_span.unwrap_or((0.0, 1.0));
    if max_ts <= min_ts {
        max_ts = min_ts + 1.0;
    }
    let max_count = accidents
        .iter()
        .chain(sudden_stops.iter())
        .map(|(_, count)| *count)
        .max()
        .unwrap_or(0);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Hazard Message Deliveries", ("sans-serif", 20))
        .margin(40)
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(min_ts..max_ts, 0usize..max_count + 1)?;

    chart
        .configure_mesh()
        .x_desc("Simulation time (s)")
        .y_desc("Deliveries")
        .draw()?;

    chart
        .draw_series(
            accidents
                .iter()
                .map(|&(ts, count)| Circle::new((ts, count), 5, RED.filled())),
        )?
        .label("accident")
        .legend(|(x, y)| Circle::new((x, y), 5, RED.filled()));
    chart
        .draw_series(
            sudden_stops
                .iter()
                .map(|&(ts, count)| Circle::new((ts, count), 5, BLUE.filled())),
        )?
        .label("sudden_stop")
        .legend(|(x, y)| Circle::new((x, y), 5, BLUE.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE)
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
