//! JSONL audit log of admin actions.
//!
//! Actions such as approve/reject/delete have no effect on the data; the
//! audit log is where they land.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// An admin action produced by the view reducer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    PersonDeleted { person_id: u32 },
    PersonSaved { person_id: u32 },
    WithdrawalApproved { withdrawal_id: u32, amount: f64 },
    WithdrawalRejected { withdrawal_id: u32, amount: f64 },
    TicketResolved { ticket_id: u32 },
}

impl AuditEvent {
    pub fn describe(&self) -> String {
        match self {
            Self::PersonDeleted { person_id } => format!("deleted person #{}", person_id),
            Self::PersonSaved { person_id } => format!("saved person #{}", person_id),
            Self::WithdrawalApproved { withdrawal_id, .. } => {
                format!("approved withdrawal #{}", withdrawal_id)
            }
            Self::WithdrawalRejected { withdrawal_id, .. } => {
                format!("rejected withdrawal #{}", withdrawal_id)
            }
            Self::TicketResolved { ticket_id } => format!("resolved ticket #{}", ticket_id),
        }
    }
}

pub struct AuditLog {
    pub path: PathBuf,
    session_id: String,
    file: File,
}

#[derive(Serialize)]
struct Entry<'a> {
    ts: DateTime<Utc>,
    session_id: &'a str,
    #[serde(flatten)]
    data: serde_json::Value,
}

impl AuditLog {
    pub fn new(path: &Path, session_id: &str) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            session_id: session_id.to_string(),
            file,
        })
    }

    /// Open `<dir>/<session_id>.jsonl`, creating the directory if needed
    pub fn in_dir(dir: &Path, session_id: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Self::new(&dir.join(format!("{}.jsonl", session_id)), session_id)
    }

    fn write(&mut self, data: serde_json::Value) -> Result<()> {
        let entry = Entry {
            ts: Utc::now(),
            session_id: &self.session_id,
            data,
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn record(&mut self, event: &AuditEvent) -> Result<()> {
        self.write(serde_json::to_value(event)?)
    }

    pub fn session_start(&mut self, data_source: &str) -> Result<()> {
        self.write(serde_json::json!({
            "type": "session_start",
            "data_source": data_source,
        }))
    }

    /// Log a REPL command as issued
    pub fn command(&mut self, line: &str) -> Result<()> {
        self.write(serde_json::json!({ "type": "command", "line": line }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = AuditLog::in_dir(&dir.path().join("audit"), "s1").unwrap();
        log.session_start("builtin").unwrap();
        log.record(&AuditEvent::WithdrawalApproved {
            withdrawal_id: 2,
            amount: 1200.0,
        })
        .unwrap();

        let content = std::fs::read_to_string(&log.path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "session_start");
        assert_eq!(lines[1]["type"], "withdrawal_approved");
        assert_eq!(lines[1]["withdrawal_id"], 2);
        assert_eq!(lines[1]["session_id"], "s1");
        assert!(lines[1]["ts"].is_string());
    }

    #[test]
    fn test_describe() {
        let event = AuditEvent::PersonDeleted { person_id: 4 };
        assert_eq!(event.describe(), "deleted person #4");
    }
}
