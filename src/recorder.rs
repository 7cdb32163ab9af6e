use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use serde_json::json;

use crate::gesture::GestureEvent;

/// Appends one JSON object per decoded gesture to a file.
pub struct EventRecorder {
    file: File,
}

impl EventRecorder {
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::info!("recording gestures to {}", path.display());
        Ok(Self { file })
    }

    pub fn record(&mut self, tick: u64, event: GestureEvent) -> io::Result<()> {
        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "tick": tick,
            "event": event.kind().label(),
            "count": event.count(),
        });

        writeln!(self.file, "{entry}")?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/events.jsonl");

        let mut recorder = EventRecorder::open(&path).unwrap();
        recorder.record(14, GestureEvent::Tap).unwrap();
        recorder.record(52, GestureEvent::MultiTap(3)).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = raw
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "tap");
        assert_eq!(lines[0]["tick"], 14);
        assert_eq!(lines[0]["count"], 1);
        assert_eq!(lines[1]["event"], "multi_tap");
        assert_eq!(lines[1]["count"], 3);
        assert!(lines[1]["ts_ms"].is_u64());
    }

    #[test]
    fn reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        EventRecorder::open(&path)
            .unwrap()
            .record(1, GestureEvent::LongTapStart)
            .unwrap();
        EventRecorder::open(&path)
            .unwrap()
            .record(9, GestureEvent::LongTapEnd)
            .unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.contains("long_tap_end"));
    }
}
