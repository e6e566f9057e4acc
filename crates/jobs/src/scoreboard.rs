use scoring::{CodelinkRule, Scoreboard, ScoreboardConfig};
use storage::models::Uid;
use tracing::debug;
use uuid::Uuid;

use crate::context::JobContext;
use crate::error::{JobError, Result};
use crate::rescore::load_codelink_contest;

#[derive(Debug, Clone)]
pub struct ScoreboardRequest {
    pub domain_id: String,
    pub contest_id: Uuid,
    pub is_export: bool,
    pub show_display_name: bool,
    /// Render what participants see: the frozen board while locked
    pub frozen: bool,
}

pub async fn build_scoreboard(ctx: &JobContext, rule: &CodelinkRule, request: &ScoreboardRequest) -> Result<Scoreboard> {
    let contest = load_codelink_contest(ctx, &request.domain_id, request.contest_id).await?;
    if request.frozen && !rule.show_scoreboard(&contest, ctx.now) {
        return Err(JobError::NotVisible(format!(
            "scoreboard of '{}' opens when the contest begins",
            contest.title
        )));
    }

    let statuses = ctx.store.list_statuses(&request.domain_id, request.contest_id).await?;
    let uids: Vec<Uid> = statuses.iter().map(|s| s.uid).collect();
    let users = ctx.store.find_users(&uids).await?;
    let problems = ctx.store.find_problems(&request.domain_id, &contest.pids).await?;

    let config = ScoreboardConfig {
        is_export: request.is_export,
        show_display_name: request.show_display_name,
        lock_at: if request.frozen { contest.effective_lock(ctx.now) } else { None },
    };
    debug!(contest = %contest.contest_id, participants = statuses.len(), frozen = config.lock_at.is_some(), "building scoreboard");

    Ok(rule.scoreboard(config, &contest, statuses, &users, &problems, ctx.now))
}
