use scoring::CodelinkRule;
use std::time::Instant;
use storage::models::{Contest, Uid};
use tracing::{info, warn};

use super::{PointLedger, PointType};
use crate::context::JobContext;
use crate::error::{JobError, Result};
use crate::report::{CaseReport, Report};

/// Points earned for a final contest rank.
pub fn rank_increment(rank: u32) -> i64 {
    match rank {
        1 => 3,
        2 => 2,
        3 => 1,
        _ => 0,
    }
}

/// Rating from finished rated contests, walked oldest first.
#[derive(Debug, Clone, Default)]
pub struct ContestPoint {
    rule: CodelinkRule,
}

impl ContestPoint {
    pub fn new(rule: CodelinkRule) -> Self {
        Self { rule }
    }

    /// Final `(rank, uid)` pairs, or `None` when nobody took part.
    async fn final_ranks(&self, ctx: &JobContext, contest: &Contest) -> Result<Option<Vec<(u32, Uid)>>> {
        if contest.rule != CodelinkRule::NAME {
            return Err(JobError::UnsupportedRule(contest.rule.clone()));
        }
        if ctx.store.count_statuses(&contest.domain_id, contest.contest_id).await? == 0 {
            return Ok(None);
        }

        let statuses = ctx.store.list_statuses(&contest.domain_id, contest.contest_id).await?;
        ctx.cancel.check()?;

        let ranked = self.rule.ranked(contest, statuses, ctx.now);
        Ok(Some(ranked.entries.iter().map(|e| (e.rank, e.status.uid)).collect()))
    }
}

#[async_trait::async_trait]
impl PointType for ContestPoint {
    fn name(&self) -> &'static str {
        "contest"
    }

    async fn run(&self, ctx: &JobContext, domain_ids: &[String], ledger: &mut PointLedger) -> Result<()> {
        let contests: Vec<Contest> = ctx
            .store
            .list_rated_contests(domain_ids)
            .await?
            .into_iter()
            .filter(|c| c.is_done(ctx.now))
            .collect();
        if !contests.is_empty() {
            ctx.message(format!("Found {} contests in {}", contests.len(), domain_ids.join(", ")));
        }

        for contest in &contests {
            ctx.cancel.check()?;
            let start = Instant::now();

            match self.final_ranks(ctx, contest).await {
                Ok(None) => continue,
                Ok(Some(ranks)) => {
                    for (rank, uid) in ranks {
                        ledger.add(uid, rank_increment(rank));
                    }
                    info!(contest = %contest.contest_id, "contest points applied");
                    ctx.reporter.report(Report::Case(CaseReport::finished(
                        format!("Contest {} finished", contest.title),
                        start.elapsed().as_millis() as u64,
                    )));
                }
                Err(JobError::Cancelled) => return Err(JobError::Cancelled),
                Err(e) => {
                    warn!(contest = %contest.contest_id, error = %e, "skipping contest");
                    ctx.reporter.report(Report::Case(CaseReport::failed(
                        format!("Contest {} failed: {}", contest.title, e),
                        start.elapsed().as_millis() as u64,
                    )));
                }
            }
        }

        Ok(())
    }
}
