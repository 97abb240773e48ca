//! # strait-audit
//!
//! Append-structured audit trail: one self-delimiting JSON object per
//! executed query, written to a file opened for append. Writes are
//! best-effort by contract — audit I/O failures are logged for the
//! operator and never fail the request that produced them.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use strait_core::port::{AuditEntry, QueryAuditor};

pub use strait_core::port::NoopAuditor;

/// NDJSON wire form of one audit record.
#[derive(Debug, Serialize)]
struct FileEntry<'a> {
    ts: String,
    tool: &'a str,
    sql: &'a str,
    rows_returned: usize,
    duration_ms: u64,
    error: Option<&'a str>,
}

/// Writes audit entries as NDJSON to an append-only file. A mutex
/// serialises record writes, so concurrent requests cannot interleave
/// within one line under POSIX append semantics.
pub struct FileAuditor {
    file: Mutex<File>,
}

impl FileAuditor {
    /// Opens (or creates) the file at `path` for append-only writing.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl QueryAuditor for FileAuditor {
    fn record(&self, entry: AuditEntry) {
        let wire = FileEntry {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tool: &entry.tool,
            sql: &entry.sql,
            rows_returned: entry.rows_returned,
            duration_ms: entry.duration_ms,
            error: entry.error.as_deref(),
        };

        let line = match serde_json::to_string(&wire) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "serialising audit entry");
                return;
            }
        };

        let mut file = match self.file.lock() {
            Ok(file) => file,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(err) = writeln!(file, "{line}") {
            tracing::warn!(error = %err, "writing audit entry");
        }
    }
}
