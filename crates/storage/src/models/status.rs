use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::journal::{JournalEntry, ProblemId, RecordId, Uid, Verdict};

/// Scoring state of one participant on one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetail {
    pub rid: RecordId,
    pub pid: ProblemId,
    pub status: Verdict,
    pub score: Decimal,
    /// Score before any first-blood bonus
    pub score_without_bonus: Decimal,
    pub wrong_attempts: u32,
    /// Seconds since contest start
    pub time: i64,
}

impl ProblemDetail {
    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }
}

/// Frozen view of a problem: the last record visible before the lock plus
/// the number of submissions hidden behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayEntry {
    pub detail: Option<ProblemDetail>,
    #[serde(default)]
    pub pending: u32,
}

impl DisplayEntry {
    pub fn visible(detail: ProblemDetail) -> Self {
        Self {
            detail: Some(detail),
            pending: 0,
        }
    }
}

pub type DetailMap = BTreeMap<ProblemId, ProblemDetail>;
pub type DisplayMap = BTreeMap<ProblemId, DisplayEntry>;

/// Per-participant contest record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContestStatus {
    pub domain_id: String,
    pub contest_id: Uuid,
    pub uid: Uid,
    #[sqlx(json)]
    pub journal: Vec<JournalEntry>,
    pub score_sum: Decimal,
    pub accept_count: i32,
    pub first_blood_count: i32,
    pub time: i64,
    #[sqlx(json)]
    pub detail: DetailMap,
    #[sqlx(json)]
    pub display: DisplayMap,
}

impl ContestStatus {
    pub fn new(domain_id: impl Into<String>, contest_id: Uuid, uid: Uid, journal: Vec<JournalEntry>) -> Self {
        Self {
            domain_id: domain_id.into(),
            contest_id,
            uid,
            journal,
            score_sum: Decimal::ZERO,
            accept_count: 0,
            first_blood_count: 0,
            time: 0,
            detail: DetailMap::new(),
            display: DisplayMap::new(),
        }
    }

    pub fn apply(&mut self, update: StandingUpdate) {
        self.score_sum = update.score_sum;
        self.accept_count = update.accept_count;
        self.first_blood_count = update.first_blood_count;
        self.time = update.time;
        self.detail = update.detail;
        self.display = update.display;
    }
}

/// Recomputed standing fields written back to a contest status record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingUpdate {
    pub uid: Uid,
    pub score_sum: Decimal,
    pub accept_count: i32,
    pub first_blood_count: i32,
    pub time: i64,
    pub detail: DetailMap,
    pub display: DisplayMap,
}
