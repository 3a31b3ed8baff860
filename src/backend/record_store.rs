//! Append-only JSON Lines conversion log.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::convert::RecordStore;
use crate::error::{Error, Result};
use crate::model::ConversionRecord;

/// Stores one record per line; the record id is its 1-based line number.
#[derive(Debug)]
pub struct JsonLinesRecordStore {
    path: PathBuf,
    /// Records in the log, counted on first save
    saved: Mutex<Option<u64>>,
}

impl JsonLinesRecordStore {
    /// Use the log at `path`, created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            saved: Mutex::new(None),
        }
    }

    /// Path of the log.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored record.
    pub fn load_records(&self) -> Result<Vec<ConversionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)?;
        BufReader::new(file)
            .lines()
            .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
            .map(|line| -> Result<ConversionRecord> { Ok(serde_json::from_str(&line?)?) })
            .collect()
    }

    fn line_count(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }
        let file = fs::File::open(&self.path)?;
        let mut count = 0;
        for line in BufReader::new(file).lines() {
            if !line?.trim().is_empty() {
                count += 1;
            }
        }
        Ok(count)
    }
}

impl RecordStore for JsonLinesRecordStore {
    fn save_record(&self, record: &ConversionRecord) -> Result<u64> {
        let persist_error = |e: &dyn std::fmt::Display| Error::Persist(e.to_string());

        let mut saved = self
            .saved
            .lock()
            .map_err(|_| Error::Persist("record store lock poisoned".into()))?;

        let count = match *saved {
            Some(count) => count,
            None => self.line_count().map_err(|e| persist_error(&e))?,
        };
        let id = count + 1;
        let line = serde_json::to_string(record).map_err(|e| persist_error(&e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| persist_error(&e))?;
        writeln!(file, "{}", line).map_err(|e| persist_error(&e))?;
        *saved = Some(id);

        log::debug!("saved record {} to {}", id, self.path.display());
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ConversionMethod;
    use std::collections::BTreeMap;

    fn record(name: &str) -> ConversionRecord {
        ConversionRecord::succeeded(
            ConversionMethod::Ocr,
            PathBuf::from(name),
            PathBuf::from("out.json"),
            BTreeMap::new(),
            2,
            1,
            Vec::new(),
            15,
        )
    }

    #[test]
    fn test_ids_increase() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesRecordStore::new(dir.path().join("records.jsonl"));
        assert_eq!(store.save_record(&record("a.pdf")).unwrap(), 1);
        assert_eq!(store.save_record(&record("b.pdf")).unwrap(), 2);

        let records = store.load_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].source, PathBuf::from("b.pdf"));
        assert_eq!(records[0].method, Some(ConversionMethod::Ocr));
    }

    #[test]
    fn test_ids_continue_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let first = JsonLinesRecordStore::new(&path);
        first.save_record(&record("a.pdf")).unwrap();
        first.save_record(&record("b.pdf")).unwrap();

        let reopened = JsonLinesRecordStore::new(&path);
        assert_eq!(reopened.save_record(&record("c.pdf")).unwrap(), 3);
        assert_eq!(reopened.save_record(&record("d.pdf")).unwrap(), 4);
        assert_eq!(reopened.load_records().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesRecordStore::new(dir.path().join("none.jsonl"));
        assert!(store.load_records().unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_path_is_persist_error() {
        let store = JsonLinesRecordStore::new("/nonexistent/dir/records.jsonl");
        let err = store.save_record(&record("a.pdf")).unwrap_err();
        assert!(matches!(err, Error::Persist(_)));
    }
}
