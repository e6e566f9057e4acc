use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use storage::models::{Contest, DetailMap, ProblemDetail, ProblemId};
use tracing::debug;

use crate::journal::ContestStat;
use crate::profile::ScoreTable;

/// Earliest accepted submission instant per problem across a whole contest.
///
/// Built from full detail maps, so the freeze never hides a first blood.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstBlood {
    first: BTreeMap<ProblemId, DateTime<Utc>>,
}

impl FirstBlood {
    pub fn resolve<'a>(details: impl IntoIterator<Item = &'a DetailMap>) -> Self {
        let mut first: BTreeMap<ProblemId, DateTime<Utc>> = BTreeMap::new();
        for detail in details.into_iter().flat_map(|d| d.values()) {
            if !detail.is_accepted() {
                continue;
            }
            let at = detail.rid.timestamp();
            first
                .entry(detail.pid)
                .and_modify(|current| *current = (*current).min(at))
                .or_insert(at);
        }
        Self { first }
    }

    pub fn get(&self, pid: ProblemId) -> Option<DateTime<Utc>> {
        self.first.get(&pid).copied()
    }

    pub fn is_first(&self, detail: &ProblemDetail) -> bool {
        detail.is_accepted() && self.get(detail.pid) == Some(detail.rid.timestamp())
    }

    /// Applies the bonus to every first-blood problem of `stat` and returns
    /// the ranking score: the sum of (possibly bonus-adjusted) full-detail
    /// scores over the contest's problems.
    pub fn apply(&self, contest: &Contest, table: &ScoreTable, stat: &mut ContestStat) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut count = 0;

        for (slot, pid) in contest.pids.iter().enumerate() {
            let Some(detail) = stat.detail.get_mut(pid) else {
                continue;
            };
            detail.score = detail.score_without_bonus;

            if self.is_first(detail)
                && let Some(profile) = table.profile(slot)
            {
                let bonus = profile.first_blood_bonus();
                debug!(pid, %bonus, "first blood bonus");
                detail.score = detail.score_without_bonus + bonus;
                count += 1;

                if let Some(shown) = stat.display.get_mut(pid).and_then(|e| e.detail.as_mut())
                    && shown.rid == detail.rid
                {
                    shown.score = detail.score;
                }
            }
            total += detail.score;
        }

        stat.first_blood_count = count;
        stat.score_sum = total;
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::tests::{contest_with, event};
    use crate::journal::{NormalizeOptions, normalize};
    use storage::models::{JournalEntry, Verdict};

    fn stat_for(contest: &Contest, journal: &[JournalEntry], table: &ScoreTable) -> ContestStat {
        let options = NormalizeOptions {
            table,
            lock_at: contest.lock_at,
            submit_after_accept: false,
        };
        normalize(contest, journal, options)
    }

    #[test]
    fn test_single_acceptor_gets_bonus() {
        let contest = contest_with(vec![1, 2], None);
        let table = ScoreTable::default();
        let mut a = stat_for(&contest, &[event(&contest, 1, 5 * 60, Verdict::Accepted)], &table);

        let first = FirstBlood::resolve([&a.detail]);
        let total = first.apply(&contest, &table, &mut a);

        assert_eq!(a.detail[&1].score_without_bonus, Decimal::from(980));
        assert_eq!(a.detail[&1].score, Decimal::from(1080));
        assert_eq!(total, Decimal::from(1080));
        assert_eq!(a.first_blood_count, 1);
    }

    #[test]
    fn test_only_earliest_acceptor_gets_bonus() {
        let contest = contest_with(vec![1], None);
        let table = ScoreTable::default();
        let mut early = stat_for(&contest, &[event(&contest, 1, 600, Verdict::Accepted)], &table);
        let mut late = stat_for(&contest, &[event(&contest, 1, 900, Verdict::Accepted)], &table);

        let first = FirstBlood::resolve([&early.detail, &late.detail]);
        first.apply(&contest, &table, &mut early);
        first.apply(&contest, &table, &mut late);

        assert_eq!(early.first_blood_count, 1);
        assert_eq!(late.first_blood_count, 0);
        assert_eq!(late.detail[&1].score, late.detail[&1].score_without_bonus);
    }

    #[test]
    fn test_exact_ties_both_get_bonus() {
        let contest = contest_with(vec![1], None);
        let table = ScoreTable::default();
        let mut a = stat_for(&contest, &[event(&contest, 1, 600, Verdict::Accepted)], &table);
        let mut b = stat_for(&contest, &[event(&contest, 1, 600, Verdict::Accepted)], &table);

        let first = FirstBlood::resolve([&a.detail, &b.detail]);
        first.apply(&contest, &table, &mut a);
        first.apply(&contest, &table, &mut b);

        assert_eq!(a.first_blood_count, 1);
        assert_eq!(b.first_blood_count, 1);
    }

    #[test]
    fn test_frozen_acceptance_still_counts() {
        let contest = contest_with(vec![1], Some(60));
        let table = ScoreTable::default();
        let mut hidden = stat_for(&contest, &[event(&contest, 1, 70 * 60, Verdict::Accepted)], &table);
        let mut visible = stat_for(&contest, &[event(&contest, 1, 80 * 60, Verdict::Accepted)], &table);
        assert!(hidden.display[&1].detail.is_none());

        let first = FirstBlood::resolve([&hidden.detail, &visible.detail]);
        first.apply(&contest, &table, &mut hidden);
        first.apply(&contest, &table, &mut visible);

        assert_eq!(hidden.first_blood_count, 1);
        assert_eq!(visible.first_blood_count, 0);
    }

    #[test]
    fn test_rejected_entries_never_count() {
        let contest = contest_with(vec![1], None);
        let table = ScoreTable::default();
        let a = stat_for(&contest, &[event(&contest, 1, 60, Verdict::WrongAnswer)], &table);
        let first = FirstBlood::resolve([&a.detail]);
        assert_eq!(first.get(1), None);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let contest = contest_with(vec![1], None);
        let table = ScoreTable::default();
        let mut a = stat_for(&contest, &[event(&contest, 1, 60, Verdict::Accepted)], &table);
        let first = FirstBlood::resolve([&a.detail]);

        let once = first.apply(&contest, &table, &mut a);
        let twice = first.apply(&contest, &table, &mut a);
        assert_eq!(once, twice);
        assert_eq!(a.display[&1].detail.as_ref().map(|d| d.score), Some(once));
    }
}
