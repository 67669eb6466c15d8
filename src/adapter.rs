use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::{
    fs,
    path::{Path, PathBuf},
};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{format_timestamp, sort_for_display, TestRunRecord};
use crate::state::State;

/// Serialized form of a [`TestRunRecord`].
///
/// Carries the same fields as the result string, in the same order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultSnapshot {
    /// A unique identifier of this result file.
    pub uuid: Uuid,
    /// Identical for every run of the same check in the same suite.
    pub history_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<i32>,
    /// Seconds, `-1` if the run was not both started and stopped.
    pub duration: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_time: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_time: Option<u32>,
    /// `<seconds>.<millis>` since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
}

impl ResultSnapshot {
    /// Captures `record`; fails for records without a name.
    pub fn capture<E, S: State>(suite: &str, record: &TestRunRecord<E, S>) -> Result<Self> {
        let name = record.name().ok_or(Error::Unnamed)?;
        let failure = record.exception();

        Ok(ResultSnapshot {
            uuid: Uuid::new_v4(),
            history_id: generate_history_id(suite, name),
            name: name.to_string(),
            state: record.state().map(ToString::to_string),
            result_code: record.state().map(State::error_code),
            errors: failure.map(|_| record.exception_messages()),
            screenshot: failure.and_then(|_| record.screenshot_path()),
            primary_key: record.primary_key(),
            duration: record.duration(),
            warning_time: record.warning_time(),
            critical_time: record.critical_time(),
            start: record.start().map(|t| format_timestamp(Some(t))),
            stop: record.stop().map(|t| format_timestamp(Some(t))),
        })
    }
}

/// Generates a deterministic history id from the suite and check names.
pub fn generate_history_id(suite: &str, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{suite}::{name}"));
    format!("{:x}", hasher.finalize())
}

/// Collects the results of one reporting run and writes them as JSON files.
///
/// Names are unique within a run; a second record with a known name is rejected.
pub struct ResultWriter {
    pub results_dir: PathBuf,
    pub suite: String,
    buffer: IndexMap<String, ResultSnapshot>,
}

impl Default for ResultWriter {
    fn default() -> Self {
        ResultWriter::new()
    }
}

impl ResultWriter {
    pub fn new() -> Self {
        ResultWriter::with_results_dir("check-results")
    }

    pub fn with_results_dir(results_dir: impl Into<PathBuf>) -> Self {
        ResultWriter {
            results_dir: results_dir.into(),
            suite: String::new(),
            buffer: IndexMap::new(),
        }
    }

    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    fn ensure_results_dir(&self) -> Result<()> {
        if !self.results_dir.exists() {
            fs::create_dir_all(&self.results_dir)?;
        }
        Ok(())
    }

    pub fn record<E, S: State>(&mut self, record: &TestRunRecord<E, S>) -> Result<()> {
        let snapshot = ResultSnapshot::capture(&self.suite, record)?;
        if self.buffer.contains_key(&snapshot.name) {
            tracing::warn!(name = %snapshot.name, "duplicate result name in run");
            return Err(Error::DuplicateName(snapshot.name));
        }
        self.buffer.insert(snapshot.name.clone(), snapshot);
        Ok(())
    }

    /// Sorts `records` for display and records them in that order.
    ///
    /// Either every record is buffered or, on error, none of them is.
    pub fn record_all<E, S: State>(&mut self, records: &mut [TestRunRecord<E, S>]) -> Result<()> {
        sort_for_display(records);

        let mut batch: IndexMap<String, ResultSnapshot> = IndexMap::with_capacity(records.len());
        for record in records.iter() {
            let snapshot = ResultSnapshot::capture(&self.suite, record)?;
            if self.buffer.contains_key(&snapshot.name) || batch.contains_key(&snapshot.name) {
                tracing::warn!(name = %snapshot.name, "duplicate result name in run");
                return Err(Error::DuplicateName(snapshot.name));
            }
            batch.insert(snapshot.name.clone(), snapshot);
        }
        self.buffer.extend(batch);
        Ok(())
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &ResultSnapshot> {
        self.buffer.values()
    }

    pub fn get(&self, name: &str) -> Option<&ResultSnapshot> {
        self.buffer.get(name)
    }

    /// Writes every buffered result as `<uuid>-result.json` and clears the buffer.
    pub fn flush(&mut self) -> Result<Vec<PathBuf>> {
        self.ensure_results_dir()?;

        let mut written = Vec::with_capacity(self.buffer.len());
        for snapshot in self.buffer.values() {
            let file_name = format!("{}-result.json", snapshot.uuid);
            let file_path = Path::new(&self.results_dir).join(file_name);

            let json = serde_json::to_string_pretty(snapshot)?;
            fs::write(&file_path, json)?;
            written.push(file_path);
        }
        self.buffer.clear();

        tracing::info!(
            count = written.len(),
            dir = %self.results_dir.display(),
            "wrote result files"
        );
        Ok(written)
    }
}
