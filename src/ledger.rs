//! Experiment bookkeeping: a CSV run ledger behind a PID-checked file lock.
//!
//! The ledger answers one question for a hyperparameter configuration: has it
//! already been run the required number of times, and if not, under which
//! experiment ID and how many runs remain. Appends from concurrent processes
//! are serialized through a sentinel lock file; the sentinel embeds the holder
//! PID so a crashed writer's lock can be detected and broken instead of
//! stalling every other writer forever.

use std::fs::{self, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{LedgerError, LedgerResult};

/// Poll interval while waiting on the sentinel lock.
const LOCK_POLL: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Column layout of one experiment class's ledger file.
///
/// The on-disk header is `exp_ID,run_ID,<params...>,<metrics...>,tag`; rows
/// are matched on the parameter columns when planning runs.
#[derive(Debug, Clone)]
pub struct LedgerSchema {
    /// Experiment class; names the subdirectory and the CSV file.
    pub class: String,
    pub param_columns: Vec<String>,
    pub metric_columns: Vec<String>,
}

impl LedgerSchema {
    fn header(&self) -> String {
        let mut columns = vec!["exp_ID".to_string(), "run_ID".to_string()];
        columns.extend(self.param_columns.iter().cloned());
        columns.extend(self.metric_columns.iter().cloned());
        columns.push("tag".to_string());
        columns.join(",")
    }
}

/// What `plan_run` decided for a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Experiment ID: reused for a known configuration, fresh otherwise.
    pub exp_id: u64,
    /// Timestamp run ID, `None` when nothing remains to run.
    pub run_id: Option<String>,
    /// Runs still needed to reach the required count.
    pub remaining: usize,
}

/// One completed run, ready to append.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub exp_id: u64,
    pub run_id: String,
    /// Parameter values in schema order.
    pub params: Vec<String>,
    /// Metric values in schema order.
    pub metrics: Vec<String>,
    pub tag: String,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// CSV-backed table of prior experiment runs for one experiment class.
#[derive(Debug)]
pub struct RunLedger {
    dir: PathBuf,
    schema: LedgerSchema,
}

impl RunLedger {
    /// Open (or create) the ledger for `schema.class` under `root`.
    ///
    /// Creates `root/<class>/<class>.csv` with the schema header if missing;
    /// an existing file must carry the exact same header.
    pub fn open(root: &Path, schema: LedgerSchema) -> LedgerResult<Self> {
        let dir = root.join(&schema.class);
        fs::create_dir_all(&dir).map_err(|source| LedgerError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let ledger = Self { dir, schema };
        let csv = ledger.csv_path();
        if csv.is_file() {
            let content = ledger.read()?;
            match content.lines().next() {
                Some(header) if header == ledger.schema.header() => {}
                _ => {
                    return Err(LedgerError::Header {
                        path: csv.display().to_string(),
                    });
                }
            }
        } else {
            fs::write(&csv, format!("{}\n", ledger.schema.header())).map_err(|source| {
                LedgerError::Io {
                    path: csv.display().to_string(),
                    source,
                }
            })?;
            tracing::info!(path = %csv.display(), "created run ledger");
        }
        Ok(ledger)
    }

    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    /// Path of the CSV file.
    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.schema.class))
    }

    /// Path of the sentinel lock file guarding appends.
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join("access.lock")
    }

    fn read(&self) -> LedgerResult<String> {
        let csv = self.csv_path();
        fs::read_to_string(&csv).map_err(|source| LedgerError::Io {
            path: csv.display().to_string(),
            source,
        })
    }

    /// Parse `(exp_id, param values)` per data row.
    fn rows(&self) -> LedgerResult<Vec<(u64, Vec<String>)>> {
        let csv = self.csv_path();
        let n_params = self.schema.param_columns.len();
        let mut rows = Vec::new();
        for (line_no, line) in self.read()?.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < 2 + n_params {
                return Err(LedgerError::Parse {
                    path: csv.display().to_string(),
                    line: line_no + 1,
                    message: format!("expected at least {} columns, got {}", 2 + n_params, fields.len()),
                });
            }
            let exp_id: u64 = fields[0].trim().parse().map_err(|_| LedgerError::Parse {
                path: csv.display().to_string(),
                line: line_no + 1,
                message: format!("bad exp_ID \"{}\"", fields[0]),
            })?;
            let params = fields[2..2 + n_params]
                .iter()
                .map(|f| f.trim().to_string())
                .collect();
            rows.push((exp_id, params));
        }
        Ok(rows)
    }

    /// Decide whether a configuration still needs runs.
    ///
    /// `param_values` align with the schema's parameter columns and are
    /// matched textually against prior rows. A fresh configuration gets
    /// `max(exp_ID) + 1` (1 on an empty ledger); a known one keeps its ID.
    pub fn plan_run(
        &self,
        param_values: &[String],
        required_runs: usize,
    ) -> LedgerResult<RunPlan> {
        if param_values.len() != self.schema.param_columns.len() {
            return Err(LedgerError::SchemaMismatch {
                section: "params",
                expected: self.schema.param_columns.len(),
                actual: param_values.len(),
            });
        }

        let rows = self.rows()?;
        let matching: Vec<&(u64, Vec<String>)> = rows
            .iter()
            .filter(|(_, params)| params == param_values)
            .collect();
        let done = matching.len();

        let plan = if done == 0 {
            // New configuration: next free experiment ID, 1 on an empty ledger.
            let exp_id = rows.iter().map(|(id, _)| *id).max().map_or(1, |m| m + 1);
            RunPlan {
                exp_id,
                run_id: Some(timestamp_run_id()),
                remaining: required_runs,
            }
        } else if done < required_runs {
            RunPlan {
                exp_id: matching[0].0,
                run_id: Some(timestamp_run_id()),
                remaining: required_runs - done,
            }
        } else {
            RunPlan {
                exp_id: matching[0].0,
                run_id: None,
                remaining: 0,
            }
        };

        tracing::info!(
            class = %self.schema.class,
            compatible = done,
            remaining = plan.remaining,
            exp_id = plan.exp_id,
            "planned experiment runs"
        );
        Ok(plan)
    }

    /// Append one run row under the sentinel lock.
    ///
    /// The lock is held only for the write and released on every exit path,
    /// including a failed write.
    pub fn append(&self, record: &RunRecord, lock_timeout: Duration) -> LedgerResult<()> {
        if record.params.len() != self.schema.param_columns.len() {
            return Err(LedgerError::SchemaMismatch {
                section: "params",
                expected: self.schema.param_columns.len(),
                actual: record.params.len(),
            });
        }
        if record.metrics.len() != self.schema.metric_columns.len() {
            return Err(LedgerError::SchemaMismatch {
                section: "metrics",
                expected: self.schema.metric_columns.len(),
                actual: record.metrics.len(),
            });
        }

        let mut row = vec![record.exp_id.to_string(), record.run_id.clone()];
        row.extend(record.params.iter().cloned());
        row.extend(record.metrics.iter().cloned());
        row.push(record.tag.clone());
        let line = row.join(",");

        let _lock = LedgerLock::acquire(&self.lock_path(), lock_timeout)?;
        let csv = self.csv_path();
        let mut file = OpenOptions::new()
            .append(true)
            .open(&csv)
            .map_err(|source| LedgerError::Io {
                path: csv.display().to_string(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| LedgerError::Io {
            path: csv.display().to_string(),
            source,
        })?;
        tracing::debug!(exp_id = record.exp_id, run_id = %record.run_id, "appended run row");
        Ok(())
    }
}

/// Run IDs are wall-clock timestamps, matching the ledger's historical format.
pub fn timestamp_run_id() -> String {
    chrono::Local::now().format("%d-%m-%Y-%H-%M-%S").to_string()
}

// ---------------------------------------------------------------------------
// Sentinel lock
// ---------------------------------------------------------------------------

/// Scoped sentinel-file lock. The file holds the owner's PID; dropping the
/// guard removes it, so release happens on every exit path. A sentinel whose
/// PID no longer names a live process is stale and gets broken.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
}

impl LedgerLock {
    /// Acquire the lock at `path`, polling once per second up to `timeout`.
    pub fn acquire(path: &Path, timeout: Duration) -> LedgerResult<Self> {
        let started = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    // Ignore a failed PID write: the lock itself is held, the
                    // PID is only used for staleness detection.
                    let _ = write!(file, "{}", std::process::id());
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Self::is_stale(path) {
                        tracing::warn!(path = %path.display(), "breaking stale ledger lock");
                        let _ = fs::remove_file(path);
                        continue;
                    }
                }
                Err(source) => {
                    return Err(LedgerError::Io {
                        path: path.display().to_string(),
                        source,
                    });
                }
            }

            if started.elapsed() >= timeout {
                return Err(LedgerError::LockTimeout {
                    path: path.display().to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            std::thread::sleep(LOCK_POLL.min(timeout.saturating_sub(started.elapsed())));
        }
    }

    /// A sentinel is stale when its recorded PID is unparseable or names no
    /// live process.
    fn is_stale(path: &Path) -> bool {
        match fs::read_to_string(path) {
            Ok(content) => match content.trim().parse::<u32>() {
                Ok(pid) => !process_alive(pid),
                Err(_) => true,
            },
            // Racing remover already broke it; retry the create.
            Err(_) => false,
        }
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // On non-unix, fall back to trusting the PID file.
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> LedgerSchema {
        LedgerSchema {
            class: "vae".into(),
            param_columns: vec!["learning_rate".into(), "dropout".into()],
            metric_columns: vec!["acc_val".into(), "acc_test".into()],
        }
    }

    fn record(exp_id: u64, lr: &str, dropout: &str) -> RunRecord {
        RunRecord {
            exp_id,
            run_id: timestamp_run_id(),
            params: vec![lr.into(), dropout.into()],
            metrics: vec!["0.9".into(), "0.88".into()],
            tag: "test".into(),
        }
    }

    #[test]
    fn open_creates_file_with_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ledger = RunLedger::open(tmp.path(), schema()).unwrap();
        let content = fs::read_to_string(ledger.csv_path()).unwrap();
        assert_eq!(
            content,
            "exp_ID,run_ID,learning_rate,dropout,acc_val,acc_test,tag\n"
        );
    }

    #[test]
    fn open_rejects_foreign_header() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("vae");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("vae.csv"), "something,else\n").unwrap();
        assert!(matches!(
            RunLedger::open(tmp.path(), schema()).unwrap_err(),
            LedgerError::Header { .. }
        ));
    }

    #[test]
    fn empty_ledger_plans_experiment_one() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ledger = RunLedger::open(tmp.path(), schema()).unwrap();
        let plan = ledger
            .plan_run(&["0.001".into(), "0.5".into()], 3)
            .unwrap();
        assert_eq!(plan.exp_id, 1);
        assert_eq!(plan.remaining, 3);
        assert!(plan.run_id.is_some());
    }

    #[test]
    fn appended_runs_reduce_the_remaining_count() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ledger = RunLedger::open(tmp.path(), schema()).unwrap();
        let params = vec!["0.001".to_string(), "0.5".to_string()];

        ledger
            .append(&record(1, "0.001", "0.5"), Duration::from_secs(5))
            .unwrap();
        let plan = ledger.plan_run(&params, 3).unwrap();
        assert_eq!(plan.exp_id, 1);
        assert_eq!(plan.remaining, 2);

        ledger
            .append(&record(1, "0.001", "0.5"), Duration::from_secs(5))
            .unwrap();
        ledger
            .append(&record(1, "0.001", "0.5"), Duration::from_secs(5))
            .unwrap();
        let plan = ledger.plan_run(&params, 3).unwrap();
        assert_eq!(plan.remaining, 0);
        assert!(plan.run_id.is_none());
    }

    #[test]
    fn new_configuration_gets_the_next_experiment_id() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ledger = RunLedger::open(tmp.path(), schema()).unwrap();
        ledger
            .append(&record(4, "0.001", "0.5"), Duration::from_secs(5))
            .unwrap();

        let plan = ledger
            .plan_run(&["0.01".into(), "0.1".into()], 2)
            .unwrap();
        assert_eq!(plan.exp_id, 5);
        assert_eq!(plan.remaining, 2);
    }

    #[test]
    fn plan_rejects_wrong_param_count() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ledger = RunLedger::open(tmp.path(), schema()).unwrap();
        assert!(matches!(
            ledger.plan_run(&["0.001".into()], 1).unwrap_err(),
            LedgerError::SchemaMismatch { .. }
        ));
    }

    #[test]
    fn lock_guard_releases_on_drop() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("access.lock");
        {
            let _lock = LedgerLock::acquire(&path, Duration::from_secs(1)).unwrap();
            assert!(path.is_file());
        }
        assert!(!path.is_file());
    }

    #[test]
    fn stale_lock_with_dead_pid_is_broken() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("access.lock");
        fs::write(&path, "not-a-pid").unwrap();

        let _lock = LedgerLock::acquire(&path, Duration::from_secs(1)).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn held_lock_times_out() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("access.lock");
        fs::write(&path, std::process::id().to_string()).unwrap();

        let err = LedgerLock::acquire(&path, Duration::ZERO).unwrap_err();
        assert!(matches!(err, LedgerError::LockTimeout { .. }));
    }
}
