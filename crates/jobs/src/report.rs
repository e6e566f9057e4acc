use serde::Serialize;
use std::sync::Mutex;
use storage::models::Verdict;
use tracing::{error, info};

/// Terminal result of one unit of batch work (a contest or a domain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    pub status: Verdict,
    pub message: String,
    pub time_ms: u64,
    pub memory: u64,
    pub score: u32,
}

impl CaseReport {
    pub fn finished(message: impl Into<String>, time_ms: u64) -> Self {
        Self {
            status: Verdict::Accepted,
            message: message.into(),
            time_ms,
            memory: 0,
            score: 0,
        }
    }

    pub fn failed(message: impl Into<String>, time_ms: u64) -> Self {
        Self {
            status: Verdict::SystemError,
            ..Self::finished(message, time_ms)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Report {
    Message(String),
    Case(CaseReport),
    Progress(u8),
}

/// Progress callback of long-running jobs.
pub trait Reporter: Send + Sync {
    fn report(&self, report: Report);

    fn message(&self, message: String) {
        self.report(Report::Message(message));
    }
}

/// Forwards reports to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, report: Report) {
        match report {
            Report::Message(message) => info!("{}", message),
            Report::Case(case) if case.status.is_accepted() => {
                info!(time_ms = case.time_ms, "✓ {}", case.message)
            }
            Report::Case(case) => error!(time_ms = case.time_ms, "✗ {}", case.message),
            Report::Progress(percent) => info!("Progress: {}%", percent),
        }
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    reports: Mutex<Vec<Report>>,
}

impl CollectingReporter {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn cases(&self) -> Vec<CaseReport> {
        self.reports()
            .into_iter()
            .filter_map(|r| match r {
                Report::Case(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, report: Report) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report);
        }
    }
}
