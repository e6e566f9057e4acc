use std::collections::BTreeSet;
use std::time::Instant;
use storage::models::{PointsUpdate, Uid, User};
use tracing::info;

use super::rank::report_ranks;
use super::{PointLedger, candidates_after, dense_rank, registry};
use crate::context::JobContext;
use crate::error::Result;
use crate::report::{CaseReport, Report};

/// Whole-run progress after finishing item `index` of `total`.
pub fn progress(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((index + 1) * 100 / total) as u8
}

/// Recomputes points for one domain, or for every domain when none is given.
pub async fn run_calc_point(ctx: &JobContext, domain_id: Option<&str>) -> Result<()> {
    if let Some(domain_id) = domain_id {
        return run_calc_point_in_domain(ctx, domain_id).await;
    }

    let domains = ctx.store.list_domain_ids().await?;
    ctx.message(format!("Found {} domains", domains.len()));

    for (i, domain_id) in domains.iter().enumerate() {
        ctx.cancel.check()?;
        let start = Instant::now();
        run_calc_point_in_domain(ctx, domain_id).await?;

        ctx.reporter.report(Report::Case(CaseReport::finished(
            format!("Domain {} finished", domain_id),
            start.elapsed().as_millis() as u64,
        )));
        ctx.reporter.report(Report::Progress(progress(i, domains.len())));
    }

    Ok(())
}

/// Runs every point type, sums the visible contributions and ranks the
/// domain, then replaces the stored points in one write. Nothing is written
/// when the job fails or is cancelled before that write.
pub async fn run_calc_point_in_domain(ctx: &JobContext, domain_id: &str) -> Result<()> {
    info!(domain_id, "calculating points");
    ctx.cancel.check()?;

    let domain_ids = [domain_id.to_string()];
    let mut ledgers: Vec<PointLedger> = Vec::new();
    let mut touched: BTreeSet<Uid> = BTreeSet::new();
    let mut update = PointsUpdate::default();

    for point_type in registry() {
        ctx.cancel.check()?;
        let mut ledger = PointLedger::new(point_type.base());
        point_type.run(ctx, &domain_ids, &mut ledger).await?;

        let uids: Vec<Uid> = ledger.uids().collect();
        let users = ctx.store.find_users(&uids).await?;
        let visible: Vec<(Uid, i64)> = ledger
            .iter()
            .filter(|(uid, _)| users.get(uid).is_some_and(User::has_profile))
            .collect();
        info!(domain_id, point_type = point_type.name(), users = visible.len(), "point type computed");

        touched.extend(visible.iter().map(|(uid, _)| *uid));
        update.point_info.push((point_type.name().to_string(), visible));
        ledgers.push(ledger);
    }

    update.points = touched
        .iter()
        .map(|uid| {
            let total: i64 = ledgers.iter().map(|ledger| ledger.get(*uid)).sum();
            (*uid, total.max(0))
        })
        .collect();

    let settings = &ctx.settings;
    let stored = ctx
        .store
        .list_rank_candidates(domain_id, &settings.rank_excluded_uids, settings.rank_uid_cutoff)
        .await?;
    update.codelink_ranks = dense_rank(&candidates_after(&stored, &update.points, settings));
    report_ranks(ctx, &update.codelink_ranks)?;

    ctx.cancel.check()?;
    let written = ctx.store.replace_points(domain_id, &update).await?;
    info!(domain_id, users = written, ranked = update.codelink_ranks.len(), "points written");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelFlag;
    use crate::error::JobError;
    use crate::report::{CollectingReporter, Reporter};
    use std::collections::BTreeMap;
    use storage::models::DomainUser;
    use crate::store::memory::MemoryStore;
    use crate::store::memory::tests::{contest, fixture_store, solved};
    use chrono::Duration;
    use std::sync::Arc;

    fn seeded() -> (MemoryStore, chrono::DateTime<chrono::Utc>) {
        let store = fixture_store();
        let first = contest("system", "Round 1", 0);
        let second = contest("system", "Round 2", 1);
        store.add_contest(first.clone());
        store.add_contest(second.clone());
        store.add_status(solved(&first, 10, &[(1, 5)]));
        store.add_status(solved(&first, 11, &[(1, 9)]));
        store.add_status(solved(&first, 13, &[(1, 2)]));
        store.add_status(solved(&second, 11, &[(1, 3)]));
        store.add_status(solved(&second, 10, &[(1, 20)]));
        (store, second.end_at + Duration::hours(1))
    }

    #[test]
    fn test_progress_floors() {
        assert_eq!(progress(0, 3), 33);
        assert_eq!(progress(1, 3), 66);
        assert_eq!(progress(2, 3), 100);
    }

    #[tokio::test]
    async fn test_points_and_ranks_for_domain() {
        let (store, now) = seeded();
        let store = Arc::new(store);
        let ctx = JobContext::new(store.clone(), Arc::new(CollectingReporter::default())).at(now);

        run_calc_point(&ctx, Some("system")).await.unwrap();

        let alice = store.domain_user("system", 10).unwrap();
        assert_eq!(alice.point, Some(2 + 2));
        assert_eq!(alice.point_info.get("contest"), Some(&4));

        let bob = store.domain_user("system", 11).unwrap();
        assert_eq!(bob.point, Some(1 + 3));
        assert_eq!(bob.codelink_rank, Some(1));
        assert_eq!(alice.codelink_rank, Some(1));

        // Ranked first in round 1 but has no profile privilege.
        let hidden = store.domain_user("system", 13).unwrap();
        assert_eq!(hidden.point, None);
        assert!(hidden.point_info.is_empty());

        let idle = store.domain_user("system", 12).unwrap();
        assert_eq!(idle.point, None);
        assert_eq!(idle.codelink_rank, Some(3));
    }

    #[tokio::test]
    async fn test_aggregation_is_idempotent() {
        let (store, now) = seeded();
        let store = Arc::new(store);
        let ctx = JobContext::new(store.clone(), Arc::new(CollectingReporter::default())).at(now);

        run_calc_point(&ctx, Some("system")).await.unwrap();
        let once = store.domain_users("system");
        run_calc_point(&ctx, Some("system")).await.unwrap();
        assert_eq!(store.domain_users("system"), once);
    }

    /// Trips the cancel flag on the first finished case.
    struct CancelOnCase(CancelFlag);

    impl Reporter for CancelOnCase {
        fn report(&self, report: Report) {
            if matches!(report, Report::Case(_)) {
                self.0.cancel();
            }
        }
    }

    fn previous_standing(store: &MemoryStore) {
        store.add_domain_user(DomainUser {
            point_info: BTreeMap::from([("contest".to_string(), 7)]),
            point: Some(7),
            codelink_rank: Some(1),
            ..DomainUser::new("system", 10)
        });
        store.add_domain_user(DomainUser {
            point: Some(2),
            codelink_rank: Some(2),
            ..DomainUser::new("system", 12)
        });
    }

    #[tokio::test]
    async fn test_cancelled_before_start_keeps_points_and_ranks() {
        let (store, now) = seeded();
        previous_standing(&store);
        let before = store.domain_users("system");
        let store = Arc::new(store);
        let ctx = JobContext::new(store.clone(), Arc::new(CollectingReporter::default())).at(now);
        ctx.cancel.cancel();

        let result = run_calc_point_in_domain(&ctx, "system").await;
        assert!(matches!(result, Err(JobError::Cancelled)));
        assert_eq!(store.domain_users("system"), before);
    }

    #[tokio::test]
    async fn test_cancelled_between_contests_keeps_points_and_ranks() {
        let (store, now) = seeded();
        previous_standing(&store);
        let before = store.domain_users("system");
        let store = Arc::new(store);
        let cancel = CancelFlag::new();
        let ctx = JobContext::new(store.clone(), Arc::new(CancelOnCase(cancel.clone())))
            .with_cancel(cancel.clone())
            .at(now);

        let result = run_calc_point_in_domain(&ctx, "system").await;
        assert!(matches!(result, Err(JobError::Cancelled)));
        assert!(cancel.is_cancelled());

        let alice = store.domain_user("system", 10).unwrap();
        assert_eq!((alice.point, alice.codelink_rank), (Some(7), Some(1)));
        assert_eq!(alice.point_info.get("contest"), Some(&7));
        assert_eq!(store.domain_users("system"), before);
    }

    #[tokio::test]
    async fn test_all_domains_report_progress() {
        let (store, now) = seeded();
        store.add_domain("empty");
        let reporter = Arc::new(CollectingReporter::default());
        let ctx = JobContext::new(Arc::new(store), reporter.clone()).at(now);

        run_calc_point(&ctx, None).await.unwrap();

        let reports = reporter.reports();
        assert_eq!(reports[0], Report::Message("Found 2 domains".to_string()));
        let progress: Vec<u8> = reports
            .iter()
            .filter_map(|r| match r {
                Report::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![50, 100]);
        let domains: Vec<String> = reporter
            .cases()
            .into_iter()
            .filter(|c| c.message.starts_with("Domain"))
            .map(|c| c.message)
            .collect();
        assert_eq!(domains, vec!["Domain empty finished", "Domain system finished"]);
    }
}
