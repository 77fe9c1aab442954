//! File-backed persistence for committed schedules

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use diyplan_core::{ScheduleSink, SchedulingResult, SinkError};

/// Writes each committed schedule as pretty JSON, replacing the file.
///
/// The JSON goes to a sibling `.tmp` file first and is renamed over the
/// target only once fully written, so a failed write leaves the previous
/// commit intact.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("schedule"), OsString::from);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_to(path: &Path, schedule: &SchedulingResult) -> Result<(), SinkError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, schedule)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl ScheduleSink for JsonFileSink {
    fn save(&mut self, schedule: &SchedulingResult) -> Result<(), SinkError> {
        let staging = self.staging_path();
        if let Err(err) = Self::write_to(&staging, schedule) {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn schedule(fingerprint: u64) -> SchedulingResult {
        SchedulingResult {
            scheduled_tasks: Vec::new(),
            inputs_fingerprint: fingerprint,
            timezone: "UTC".into(),
            project_finish: None,
            target_met: true,
            total_cost: Decimal::ZERO,
        }
    }

    #[test]
    fn save_replaces_previous_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("committed.json");
        let mut sink = JsonFileSink::new(&path);

        sink.save(&schedule(1)).unwrap();
        sink.save(&schedule(2)).unwrap();

        let saved: SchedulingResult =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.inputs_fingerprint, 2);
        assert!(!dir.path().join("committed.json.tmp").exists());
    }

    #[test]
    fn failed_write_keeps_previous_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("committed.json");
        let mut sink = JsonFileSink::new(&path);
        sink.save(&schedule(1)).unwrap();

        // A directory in the staging spot makes the write fail
        fs::create_dir(dir.path().join("committed.json.tmp")).unwrap();
        assert!(matches!(sink.save(&schedule(2)), Err(SinkError::Io(_))));

        let saved: SchedulingResult =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.inputs_fingerprint, 1);
    }
}
