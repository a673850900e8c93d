use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AppResult;

/// Counters the pipeline keeps while running.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    pub photos_processed: u64,
    pub photos_uploaded: u64,
    pub errors: u64,
}

/// Snapshot written to the status file so an operator (or the setup
/// scripts) can see what the pipeline is doing without tailing logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub system_status: String,
    pub stats: PipelineStats,
    pub base_url: String,
    pub watch_directory: Option<PathBuf>,
    pub active_event_id: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    pub fn new(system_status: &str, base_url: &str) -> Self {
        Self {
            system_status: system_status.to_string(),
            stats: PipelineStats::default(),
            base_url: base_url.to_string(),
            watch_directory: None,
            active_event_id: None,
            last_updated: None,
        }
    }
}

/// Write the snapshot, stamping `last_updated` with the current time.
pub fn write_status(snapshot: &mut StatusSnapshot, path: &Path) -> AppResult<()> {
    snapshot.last_updated = Some(Utc::now());
    let raw = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, raw)?;
    Ok(())
}

pub fn read_status(path: &Path) -> AppResult<StatusSnapshot> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips() {
        let path = std::env::temp_dir().join("status_roundtrip_test.json");

        let mut snapshot = StatusSnapshot::new("running", "http://localhost:3002");
        snapshot.stats.photos_uploaded = 7;
        snapshot.active_event_id = Some("evt-1".to_string());

        write_status(&mut snapshot, &path).unwrap();
        let read_back = read_status(&path).unwrap();

        assert_eq!(read_back.system_status, "running");
        assert_eq!(read_back.stats.photos_uploaded, 7);
        assert_eq!(read_back.active_event_id.as_deref(), Some("evt-1"));
        assert!(read_back.last_updated.is_some());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_status_file_errors() {
        assert!(read_status(Path::new("no_such_status.json")).is_err());
    }
}
