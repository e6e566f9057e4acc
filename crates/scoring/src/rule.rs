use chrono::{DateTime, Utc};
use std::collections::HashMap;
use storage::models::{CODELINK_RULE, Contest, ContestStatus, JournalEntry, Problem, ProblemId, Uid, User};
use tracing::debug;

use crate::first_blood::FirstBlood;
use crate::journal::{ContestStat, NormalizeOptions, normalize};
use crate::profile::ScoreTable;
use crate::ranking::{Standing, rank_by};
use crate::scoreboard::{Scoreboard, ScoreboardConfig, ScoreboardRenderer};

/// One participant after first-blood adjustment and ranking.
#[derive(Debug, Clone)]
pub struct RankedStatus {
    pub rank: u32,
    pub standing: Standing,
    pub stat: ContestStat,
    pub status: ContestStatus,
}

#[derive(Debug, Clone, Default)]
pub struct RankedContest {
    pub first_blood: FirstBlood,
    pub entries: Vec<RankedStatus>,
}

/// The codelink contest format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodelinkRule {
    pub table: ScoreTable,
    /// Keep scoring a problem after it was accepted
    pub submit_after_accept: bool,
}

impl Default for CodelinkRule {
    fn default() -> Self {
        Self::new(ScoreTable::default())
    }
}

impl CodelinkRule {
    pub const NAME: &'static str = CODELINK_RULE;

    pub fn new(table: ScoreTable) -> Self {
        Self {
            table,
            submit_after_accept: false,
        }
    }

    pub fn show_scoreboard(&self, contest: &Contest, now: DateTime<Utc>) -> bool {
        now > contest.begin_at
    }

    pub fn show_self_record(&self, _contest: &Contest, _now: DateTime<Utc>) -> bool {
        true
    }

    pub fn show_record(&self, contest: &Contest, now: DateTime<Utc>) -> bool {
        now > contest.end_at && !contest.is_locked(now)
    }

    /// Per-participant stat with the freeze applied as of `now`.
    pub fn stat(&self, contest: &Contest, journal: &[JournalEntry], now: DateTime<Utc>) -> ContestStat {
        let options = NormalizeOptions {
            table: &self.table,
            lock_at: contest.effective_lock(now),
            submit_after_accept: self.submit_after_accept,
        };
        normalize(contest, journal, options)
    }

    /// Normalizes every journal, resolves first bloods over the full detail
    /// maps, then sorts. Ranks are sequential even for identical standings.
    pub fn ranked(&self, contest: &Contest, statuses: Vec<ContestStatus>, now: DateTime<Utc>) -> RankedContest {
        let stats: Vec<ContestStat> = statuses
            .iter()
            .map(|status| self.stat(contest, &status.journal, now))
            .collect();
        let first_blood = FirstBlood::resolve(stats.iter().map(|s| &s.detail));

        let entries = statuses
            .into_iter()
            .zip(stats)
            .map(|(status, mut stat)| {
                first_blood.apply(contest, &self.table, &mut stat);
                let standing = Standing {
                    uid: status.uid,
                    score_sum: stat.score_sum,
                    accept_count: stat.accept_count,
                    first_blood_count: stat.first_blood_count,
                    time: stat.time,
                };
                RankedStatus {
                    rank: 0,
                    standing,
                    stat,
                    status,
                }
            })
            .collect();

        let entries: Vec<RankedStatus> = rank_by(entries, |e| &e.standing)
            .into_iter()
            .map(|(rank, mut entry)| {
                entry.rank = rank;
                entry
            })
            .collect();
        debug!(contest = %contest.contest_id, participants = entries.len(), "ranked contest");

        RankedContest { first_blood, entries }
    }

    pub fn scoreboard(
        &self,
        config: ScoreboardConfig,
        contest: &Contest,
        statuses: Vec<ContestStatus>,
        users: &HashMap<Uid, User>,
        problems: &HashMap<ProblemId, Problem>,
        now: DateTime<Utc>,
    ) -> Scoreboard {
        let ranked = self.ranked(contest, statuses, now);
        ScoreboardRenderer {
            config,
            contest,
            users,
            problems,
        }
        .render(&ranked)
    }
}
