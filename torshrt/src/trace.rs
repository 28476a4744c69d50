//! Optional JSONL trace of evaluated commands, one record per line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RtError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    pub seq: u64,
    pub command: String,
    pub ok: bool,
    pub result: String,
}

#[derive(Debug, Clone)]
pub struct TraceLog {
    path: PathBuf,
    seq: u64,
}

impl TraceLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        TraceLog {
            path: path.as_ref().to_path_buf(),
            seq: 0,
        }
    }

    /// Append one record; `result` holds the command result or the error
    /// message, depending on `ok`.
    pub fn append(&mut self, command: &str, ok: bool, result: &str) -> Result<(), RtError> {
        let record = TraceRecord {
            seq: self.seq,
            command: command.to_string(),
            ok,
            result: result.to_string(),
        };
        self.seq += 1;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| RtError::domain(e.to_string()))?;
        let line = serde_json::to_string(&record).map_err(|e| RtError::domain(e.to_string()))? + "\n";
        file.write_all(line.as_bytes())
            .map_err(|e| RtError::domain(e.to_string()))
    }
}
