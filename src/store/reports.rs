use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::error::{StoreError, StoreResult};
use crate::repair::types::{NewReport, Report};

/// Append-only repository of repair reports.
///
/// Implementations assign ids from a monotonically increasing counter starting at 1.
/// Ids are never reused and reports are never mutated or removed.
pub trait ReportStore: Send + Sync {
    /// Assigns the next id to `report`, stores it, and returns the stored record.
    fn append(&self, report: NewReport) -> StoreResult<Report>;

    /// Returns the stored reports for `ids`, in `ids` order.
    ///
    /// Unknown ids are skipped; a repeated id is returned once.
    fn list_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<Report>>;

    /// The id the next `append` will assign.
    fn next_id(&self) -> u64;

    /// Number of stored reports.
    fn len(&self) -> usize;

    /// Returns `true` if no report has been stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct ReportLog {
    next_id: u64,
    reports: BTreeMap<u64, Report>,
}

impl Default for ReportLog {
    fn default() -> Self {
        Self {
            next_id: 1,
            reports: BTreeMap::new(),
        }
    }
}

impl ReportLog {
    fn assign(&mut self, report: NewReport) -> Report {
        let id = self.next_id;
        self.next_id += 1;

        Report {
            id,
            location: report.location,
            description: report.description,
            vector: report.vector,
            image_url: report.image_url,
            created_at: Utc::now(),
        }
    }

    fn insert(&mut self, report: Report) {
        self.next_id = self.next_id.max(report.id + 1);
        self.reports.insert(report.id, report);
    }

    fn list_by_ids(&self, ids: &[u64]) -> Vec<Report> {
        let mut seen = HashSet::with_capacity(ids.len());
        ids.iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| self.reports.get(id).cloned())
            .collect()
    }
}

#[derive(Debug, Default)]
/// Process-local report store.
pub struct InMemoryReportStore {
    log: Mutex<ReportLog>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportStore for InMemoryReportStore {
    fn append(&self, report: NewReport) -> StoreResult<Report> {
        let mut log = self.log.lock();
        let report = log.assign(report);
        log.insert(report.clone());
        debug!(report_id = report.id, "Report appended");
        Ok(report)
    }

    fn list_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<Report>> {
        Ok(self.log.lock().list_by_ids(ids))
    }

    fn next_id(&self) -> u64 {
        self.log.lock().next_id
    }

    fn len(&self) -> usize {
        self.log.lock().reports.len()
    }
}

#[derive(Debug)]
struct JsonlState {
    log: ReportLog,
    file: File,
}

#[derive(Debug)]
/// Report store persisted as one JSON object per line.
///
/// The whole file is replayed into memory on open; each append writes and syncs one
/// line while holding the same lock that assigns the id. A failed append truncates the
/// file back to its previous length, and a torn final line found on open is dropped.
pub struct JsonlReportStore {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

impl JsonlReportStore {
    /// Opens (or creates) the log at `path` and replays existing reports.
    pub fn open(path: PathBuf) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|_| StoreError::StorageUnavailable {
                path: parent.to_path_buf(),
            })?;
        }

        let mut log = ReportLog::default();
        let mut torn_at = None;
        let mut unterminated = false;

        if path.exists() {
            let contents = fs::read(&path)?;
            let (complete, tail) = match contents.iter().rposition(|b| *b == b'\n') {
                Some(pos) => contents.split_at(pos + 1),
                None => contents.split_at(0),
            };

            for (idx, line) in complete.split(|b| *b == b'\n').enumerate() {
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let report: Report =
                    serde_json::from_slice(line).map_err(|e| StoreError::CorruptLog {
                        path: path.clone(),
                        line: idx + 1,
                        reason: e.to_string(),
                    })?;
                log.insert(report);
            }

            // Only the unterminated last line can be the remains of an interrupted append.
            if !tail.iter().all(u8::is_ascii_whitespace) {
                match serde_json::from_slice::<Report>(tail) {
                    Ok(report) => {
                        log.insert(report);
                        unterminated = true;
                    }
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            bytes = tail.len(),
                            error = %e,
                            "Dropping torn final line of report log"
                        );
                        torn_at = Some(complete.len() as u64);
                    }
                }
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if let Some(len) = torn_at {
            file.set_len(len)?;
        }
        if unterminated {
            file.write_all(b"\n")?;
        }

        info!(
            path = %path.display(),
            reports = log.reports.len(),
            next_id = log.next_id,
            "Report log opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(JsonlState { log, file }),
        })
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportStore for JsonlReportStore {
    fn append(&self, report: NewReport) -> StoreResult<Report> {
        let mut state = self.state.lock();
        // A failed write burns the id rather than risking reuse on replay.
        let report = state.log.assign(report);

        let mut line = serde_json::to_vec(&report)?;
        line.push(b'\n');

        let offset = state.file.metadata()?.len();
        if let Err(e) = write_line(&mut state.file, &line) {
            if let Err(rollback) = state.file.set_len(offset) {
                warn!(report_id = report.id, error = %rollback, "Failed to roll back partial report line");
            }
            return Err(e.into());
        }

        state.log.insert(report.clone());
        debug!(report_id = report.id, "Report appended to log");
        Ok(report)
    }

    fn list_by_ids(&self, ids: &[u64]) -> StoreResult<Vec<Report>> {
        Ok(self.state.lock().log.list_by_ids(ids))
    }

    fn next_id(&self) -> u64 {
        self.state.lock().log.next_id
    }

    fn len(&self) -> usize {
        self.state.lock().log.reports.len()
    }
}

fn write_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line)?;
    file.sync_data()
}
