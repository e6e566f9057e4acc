//! Turns one participant's journal into per-problem scoring state.
//!
//! Two maps are built side by side. The detail map follows every event in
//! true time order. The display map stops at the scoreboard lock: events
//! after it only bump the problem's pending counter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use storage::models::{
    Contest, DetailMap, DisplayEntry, DisplayMap, JournalEntry, ProblemDetail, ProblemId,
    StandingUpdate, Uid,
};
use tracing::trace;

use crate::profile::ScoreTable;
use crate::score::{Elapsed, score};

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions<'a> {
    pub table: &'a ScoreTable,
    /// Effective lock instant, `None` when the scoreboard is not frozen
    pub lock_at: Option<DateTime<Utc>>,
    pub submit_after_accept: bool,
}

/// Per-participant result of normalizing a journal.
///
/// `accept_count`, `time` and `score_sum` only cover the display map, so the
/// visible summary respects the freeze. `FirstBlood::apply` later replaces
/// `score_sum` with the bonus-adjusted total of the full detail map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContestStat {
    pub detail: DetailMap,
    pub display: DisplayMap,
    pub score_sum: Decimal,
    pub accept_count: u32,
    pub first_blood_count: u32,
    pub time: i64,
}

impl ContestStat {
    pub fn into_update(self, uid: Uid) -> StandingUpdate {
        StandingUpdate {
            uid,
            score_sum: self.score_sum,
            accept_count: self.accept_count as i32,
            first_blood_count: self.first_blood_count as i32,
            time: self.time,
            detail: self.detail,
            display: self.display,
        }
    }
}

/// Running counters for a single participant's pass.
#[derive(Debug, Default)]
struct JournalAccumulator {
    wrong_attempts: HashMap<ProblemId, u32>,
    pending: HashMap<ProblemId, u32>,
    detail: DetailMap,
    display: DisplayMap,
}

impl JournalAccumulator {
    fn is_accepted(&self, pid: ProblemId) -> bool {
        self.detail.get(&pid).is_some_and(ProblemDetail::is_accepted)
    }

    fn record_attempt(&mut self, entry: &JournalEntry) -> u32 {
        let counter = self.wrong_attempts.entry(entry.pid).or_insert(0);
        if entry.status.counts_as_attempt() {
            *counter += 1;
        }
        *counter
    }

    fn hide(&mut self, pid: ProblemId) {
        let pending = self.pending.entry(pid).or_insert(0);
        *pending += 1;
        self.display.entry(pid).or_default().pending = *pending;
    }

    fn finish(self) -> ContestStat {
        let mut stat = ContestStat {
            detail: self.detail,
            display: self.display,
            ..Default::default()
        };
        for detail in stat.display.values().filter_map(|e| e.detail.as_ref()) {
            if detail.is_accepted() {
                stat.accept_count += 1;
                stat.time += detail.time;
                stat.score_sum += detail.score;
            }
        }
        stat
    }
}

/// Normalizes a time-ordered journal against the contest's problem slots.
pub fn normalize(contest: &Contest, journal: &[JournalEntry], options: NormalizeOptions<'_>) -> ContestStat {
    let mut acc = JournalAccumulator::default();

    for entry in journal {
        let Some(slot) = contest.slot_of(entry.pid) else {
            trace!(pid = entry.pid, "skipping event for problem outside the contest");
            continue;
        };
        let Some(profile) = options.table.profile(slot) else {
            trace!(pid = entry.pid, slot, "skipping event for unscored slot");
            continue;
        };
        if !options.submit_after_accept && acc.is_accepted(entry.pid) {
            continue;
        }

        let wrong_attempts = acc.record_attempt(entry);
        let submitted_at = entry.submitted_at();
        let elapsed = Elapsed::between(contest.begin_at, submitted_at);
        let value = score(profile, elapsed.minutes, wrong_attempts, entry.status);

        let detail = ProblemDetail {
            rid: entry.rid,
            pid: entry.pid,
            status: entry.status,
            score: value,
            score_without_bonus: value,
            wrong_attempts,
            time: elapsed.seconds,
        };
        acc.detail.insert(entry.pid, detail.clone());

        if options.lock_at.is_some_and(|lock_at| submitted_at > lock_at) {
            acc.hide(entry.pid);
            continue;
        }
        acc.display.insert(entry.pid, DisplayEntry::visible(detail));
    }

    acc.finish()
}
