//! CSV log sink: durable, sampled position records.
//!
//! The sampling cadence is the engine's decision (`LogPolicy`); this
//! sink just appends whatever it is handed, creating the file with a
//! header row on first use.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use zonewatch_engine::{LocationPayload, LogSink, SinkError};

const CSV_HEADER: &str = "waktu,lat_raw,lon_raw,lat_alt,lon_alt,statusZona\n";

pub struct CsvLogSink {
    path: PathBuf,
}

impl CsvLogSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub(crate) fn format_csv_row(snapshot: &LocationPayload) -> String {
    format!(
        "{},{},{},{},{},{}\n",
        snapshot.waktu.to_rfc3339(),
        field(snapshot.lat_raw),
        field(snapshot.lon_raw),
        field(snapshot.lat_alt),
        field(snapshot.lon_alt),
        snapshot.status_zona
    )
}

impl LogSink for CsvLogSink {
    fn record(&self, snapshot: &LocationPayload) -> Result<(), SinkError> {
        let fresh = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            file.write_all(CSV_HEADER.as_bytes())?;
        }
        file.write_all(format_csv_row(snapshot).as_bytes())?;
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use zonewatch_core::ZoneVerdict;

    fn snapshot(status: ZoneVerdict) -> LocationPayload {
        LocationPayload {
            lat_raw: Some(-6.2),
            lon_raw: Some(106.816),
            lat_alt: None,
            lon_alt: None,
            status_zona: status,
            waktu: DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
                .expect("valid RFC3339")
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn row_format_with_missing_alternate() {
        let row = format_csv_row(&snapshot(ZoneVerdict::Inside));
        assert_eq!(row, "2026-03-01T08:00:00+00:00,-6.2,106.816,,,Aman\n");
    }

    #[test]
    fn header_written_once_then_rows_append() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gps_log.csv");
        let sink = CsvLogSink::new(path.clone());

        sink.record(&snapshot(ZoneVerdict::Inside)).expect("record");
        sink.record(&snapshot(ZoneVerdict::Outside))
            .expect("record");

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "waktu,lat_raw,lon_raw,lat_alt,lon_alt,statusZona");
        assert!(lines[1].ends_with("Aman"));
        assert!(lines[2].ends_with("Bahaya"));
    }

    #[test]
    fn record_fails_on_unwritable_path() {
        let sink = CsvLogSink::new(PathBuf::from("/nonexistent-dir/gps_log.csv"));
        let err = sink.record(&snapshot(ZoneVerdict::Unknown)).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
