// monitoring/event_log.rs
use crate::error::Result;
use crate::shared_data::{EventRecord, MessageType};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Serializes `value` as JSON indented by four spaces.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    Ok(out)
}

/// Writes `value` to `path` in one go, replacing any existing file.
pub fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_pretty_json(value)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Ordered, append-only list of delivered hazard messages.
/// Serializes as a bare JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: EventRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }

    pub fn count_of(&self, message_type: MessageType) -> usize {
        self.records
            .iter()
            .filter(|r| r.message_type == message_type)
            .count()
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_pretty_json(path, self)
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl From<Vec<EventRecord>> for EventLog {
    fn from(records: Vec<EventRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Result of reading a written log back.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Missing,
    /// The file parsed; `pretty` holds it re-indented for display.
    Loaded { records: usize, pretty: String },
    /// The file exists but is not a valid event log.
    Invalid(String),
}

/// Re-reads an event log file. Decode failures are reported, not raised.
pub fn verify_json_file(path: &Path) -> Result<Verification> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Verification::Missing),
        Err(e) => return Err(e.into()),
    };
    let log: EventLog = match serde_json::from_str(&raw) {
        Ok(log) => log,
        Err(e) => return Ok(Verification::Invalid(e.to_string())),
    };
    let pretty = String::from_utf8_lossy(&to_pretty_json(&log)?).into_owned();
    Ok(Verification::Loaded {
        records: log.len(),
        pretty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(receiver: &str, sender: &str, message_type: MessageType, timestamp: f64) -> EventRecord {
        EventRecord {
            receiver_vehicle: receiver.to_string(),
            sender_vehicle: sender.to_string(),
            message_type,
            timestamp,
        }
    }

    #[test]
    fn written_log_reads_back_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_logs.json");
        let log = EventLog::from(vec![
            record("veh1", "veh0", MessageType::Accident, 4.0),
            record("veh2", "veh0", MessageType::Accident, 4.0),
            record("veh0", "veh3", MessageType::SuddenStop, 17.5),
        ]);

        log.write_json(&path).unwrap();
        assert_eq!(EventLog::read_json(&path).unwrap(), log);
    }

    #[test]
    fn empty_log_is_an_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_logs.json");
        EventLog::new().write_json(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn output_uses_four_space_indent() {
        let log = EventLog::from(vec![record("b", "a", MessageType::SuddenStop, 1.0)]);
        let text = String::from_utf8(to_pretty_json(&log).unwrap()).unwrap();
        assert!(text.starts_with("[\n    {\n        \"receiver_vehicle\": \"b\","));
    }

    #[test]
    fn verification_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event_logs.json");
        assert_eq!(verify_json_file(&path).unwrap(), Verification::Missing);

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            verify_json_file(&path).unwrap(),
            Verification::Invalid(_)
        ));

        EventLog::from(vec![record("b", "a", MessageType::Accident, 2.0)])
            .write_json(&path)
            .unwrap();
        match verify_json_file(&path).unwrap() {
            Verification::Loaded { records, pretty } => {
                assert_eq!(records, 1);
                assert!(pretty.contains("\"message_type\": \"accident\""));
            }
            other => panic!("unexpected verification result: {:?}", other),
        }
    }

    #[test]
    fn counts_per_message_type() {
        let log = EventLog::from(vec![
            record("b", "a", MessageType::Accident, 1.0),
            record("c", "a", MessageType::Accident, 1.0),
            record("a", "c", MessageType::SuddenStop, 3.0),
        ]);
        assert_eq!(log.count_of(MessageType::Accident), 2);
        assert_eq!(log.count_of(MessageType::SuddenStop), 1);
    }
}
