use scoring::CodelinkRule;
use serde::Serialize;
use storage::models::{Contest, StandingUpdate};
use tracing::info;
use uuid::Uuid;

use crate::context::JobContext;
use crate::error::{JobError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RescoreSummary {
    pub participants: usize,
    pub written: u64,
}

/// Loads a contest and makes sure it is scored by the codelink rule.
pub(crate) async fn load_codelink_contest(ctx: &JobContext, domain_id: &str, contest_id: Uuid) -> Result<Contest> {
    let contest = ctx
        .store
        .find_contest(domain_id, contest_id)
        .await?
        .ok_or_else(|| JobError::NotFound(format!("Contest '{}' not found in domain '{}'", contest_id, domain_id)))?;
    if contest.rule != CodelinkRule::NAME {
        return Err(JobError::UnsupportedRule(contest.rule));
    }
    Ok(contest)
}

/// Recomputes and stores every participant's standing of one contest.
pub async fn run_rescore(
    ctx: &JobContext,
    rule: &CodelinkRule,
    domain_id: &str,
    contest_id: Uuid,
) -> Result<RescoreSummary> {
    let contest = load_codelink_contest(ctx, domain_id, contest_id).await?;
    let statuses = ctx.store.list_statuses(domain_id, contest_id).await?;
    ctx.cancel.check()?;

    let ranked = rule.ranked(&contest, statuses, ctx.now);
    let updates: Vec<StandingUpdate> = ranked
        .entries
        .into_iter()
        .map(|entry| entry.stat.into_update(entry.status.uid))
        .collect();

    let written = ctx.store.write_standings(domain_id, contest_id, &updates).await?;
    info!(contest = %contest_id, written, "standings rescored");
    ctx.message(format!("Rescored {} participants of {}", updates.len(), contest.title));

    Ok(RescoreSummary {
        participants: updates.len(),
        written,
    })
}
