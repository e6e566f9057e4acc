use std::collections::BTreeMap;
use storage::models::Uid;
use tracing::info;

use crate::context::JobContext;
use crate::error::Result;
use crate::settings::JobSettings;

/// Progress message interval of the rank pass.
const REPORT_EVERY: usize = 100;

/// Dense codelink rank over candidates already sorted by point descending.
///
/// A run of equal points shares the 1-based position of its first member.
/// Zero counts as no point, and consecutive point-less users form one run.
pub fn dense_rank(candidates: &[(Uid, Option<i64>)]) -> Vec<(Uid, i64)> {
    let mut ranks = Vec::with_capacity(candidates.len());
    let mut last: Option<Option<i64>> = None;
    let mut rank = 0;

    for (i, (uid, point)) in candidates.iter().enumerate() {
        let point = point.filter(|p| *p != 0);
        if last != Some(point) {
            rank = i as i64 + 1;
        }
        ranks.push((*uid, rank));
        last = Some(point);
    }
    ranks
}

/// Candidates as they stand once `points` replace every stored point:
/// users listed there hold their new point, everyone else holds none.
pub fn candidates_after(
    stored: &[(Uid, Option<i64>)],
    points: &[(Uid, i64)],
    settings: &JobSettings,
) -> Vec<(Uid, Option<i64>)> {
    let mut merged: BTreeMap<Uid, Option<i64>> = stored.iter().map(|(uid, _)| (*uid, None)).collect();
    for (uid, point) in points {
        if settings.is_rank_candidate(*uid) {
            merged.insert(*uid, Some(*point));
        }
    }

    let mut candidates: Vec<(Uid, Option<i64>)> = merged.into_iter().collect();
    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    candidates
}

/// Walks the computed ranks, reporting every hundredth one.
pub(crate) fn report_ranks(ctx: &JobContext, ranks: &[(Uid, i64)]) -> Result<()> {
    for (i, (_, rank)) in ranks.iter().enumerate() {
        let count = i + 1;
        if count % REPORT_EVERY == 0 {
            ctx.cancel.check()?;
            ctx.message(format!("#{}: codelink_rank {}", count, rank));
        }
    }
    Ok(())
}

pub async fn run_calc_codelink_rank_in_domain(ctx: &JobContext, domain_id: &str) -> Result<()> {
    ctx.cancel.check()?;

    let settings = &ctx.settings;
    let candidates = ctx
        .store
        .list_rank_candidates(domain_id, &settings.rank_excluded_uids, settings.rank_uid_cutoff)
        .await?;
    let ranks = dense_rank(&candidates);
    report_ranks(ctx, &ranks)?;

    ctx.cancel.check()?;
    let written = ctx.store.replace_codelink_ranks(domain_id, &ranks).await?;
    info!(domain_id, users = written, "codelink ranks written");

    Ok(())
}
