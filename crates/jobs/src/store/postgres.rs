use sqlx::PgPool;
use std::collections::HashMap;
use storage::Result;
use storage::dto::common::PaginationParams;
use storage::models::{
    Contest, ContestStatus, DomainUser, Group, NewContest, PointsUpdate, Problem, ProblemId, StandingUpdate, Uid,
    User,
};
use storage::repository::{
    ContestRepository, DomainUserRepository, GroupRepository, ProblemRepository, StatusRepository, UserRepository,
};
use uuid::Uuid;

use crate::traits::{ContestStore, DomainStore, UserStore};

/// Store backed by the Postgres repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ContestStore for PgStore {
    async fn list_rated_contests(&self, domain_ids: &[String]) -> Result<Vec<Contest>> {
        ContestRepository::new(&self.pool).list_rated(domain_ids).await
    }

    async fn find_contest(&self, domain_id: &str, contest_id: Uuid) -> Result<Option<Contest>> {
        ContestRepository::new(&self.pool).find_optional(domain_id, contest_id).await
    }

    async fn count_statuses(&self, domain_id: &str, contest_id: Uuid) -> Result<i64> {
        StatusRepository::new(&self.pool).count_with_journal(domain_id, contest_id).await
    }

    async fn list_statuses(&self, domain_id: &str, contest_id: Uuid) -> Result<Vec<ContestStatus>> {
        StatusRepository::new(&self.pool).list_with_journal(domain_id, contest_id).await
    }

    async fn write_standings(&self, domain_id: &str, contest_id: Uuid, updates: &[StandingUpdate]) -> Result<u64> {
        StatusRepository::new(&self.pool)
            .write_standings(domain_id, contest_id, updates)
            .await
    }

    async fn create_contest(&self, contest: &NewContest) -> Result<Contest> {
        ContestRepository::new(&self.pool).create(contest).await
    }
}

#[async_trait::async_trait]
impl DomainStore for PgStore {
    async fn list_domain_ids(&self) -> Result<Vec<String>> {
        DomainUserRepository::new(&self.pool).list_domain_ids().await
    }

    async fn replace_points(&self, domain_id: &str, update: &PointsUpdate) -> Result<u64> {
        DomainUserRepository::new(&self.pool).replace_points(domain_id, update).await
    }

    async fn replace_codelink_ranks(&self, domain_id: &str, ranks: &[(Uid, i64)]) -> Result<u64> {
        DomainUserRepository::new(&self.pool)
            .replace_codelink_ranks(domain_id, ranks)
            .await
    }

    async fn list_rank_candidates(
        &self,
        domain_id: &str,
        excluded_uids: &[Uid],
        uid_cutoff: Uid,
    ) -> Result<Vec<(Uid, Option<i64>)>> {
        DomainUserRepository::new(&self.pool)
            .list_rank_candidates(domain_id, excluded_uids, uid_cutoff)
            .await
    }

    async fn list_with_point(&self, domain_id: &str, uids: &[Uid]) -> Result<Vec<(Uid, i64)>> {
        DomainUserRepository::new(&self.pool).list_with_point(domain_id, uids).await
    }

    async fn list_ranking_page(
        &self,
        domain_id: &str,
        pagination: &PaginationParams,
    ) -> Result<(Vec<DomainUser>, i64)> {
        DomainUserRepository::new(&self.pool)
            .list_ranking_page(domain_id, pagination)
            .await
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn find_users(&self, uids: &[Uid]) -> Result<HashMap<Uid, User>> {
        UserRepository::new(&self.pool).find_many(uids).await
    }

    async fn find_group(&self, domain_id: &str, name: &str) -> Result<Option<Group>> {
        GroupRepository::new(&self.pool).find_by_name(domain_id, name).await
    }

    async fn find_problems(&self, domain_id: &str, pids: &[ProblemId]) -> Result<HashMap<ProblemId, Problem>> {
        ProblemRepository::new(&self.pool).find_many(domain_id, pids).await
    }
}
