use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{JobError, Result};
use crate::report::Reporter;
use crate::settings::JobSettings;
use crate::traits::Store;

/// Cooperative stop signal shared between a job and whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fails with `JobError::Cancelled` once the flag is tripped.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(JobError::Cancelled)
        } else {
            Ok(())
        }
    }
}

pub struct JobContext {
    pub store: Arc<dyn Store>,
    pub reporter: Arc<dyn Reporter>,
    pub cancel: CancelFlag,
    pub settings: JobSettings,
    /// Instant the job treats as "now" for lock and finish checks
    pub now: DateTime<Utc>,
}

impl JobContext {
    pub fn new(store: Arc<dyn Store>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            store,
            reporter,
            cancel: CancelFlag::new(),
            settings: JobSettings::default(),
            now: Utc::now(),
        }
    }

    pub fn with_settings(mut self, settings: JobSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn message(&self, message: impl Into<String>) {
        self.reporter.message(message.into());
    }
}
