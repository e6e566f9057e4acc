use std::collections::HashMap;
use storage::Result;
use storage::dto::common::PaginationParams;
use storage::models::{
    Contest, ContestStatus, DomainUser, Group, NewContest, PointsUpdate, Problem, ProblemId, StandingUpdate, Uid,
    User,
};
use uuid::Uuid;

#[async_trait::async_trait]
pub trait ContestStore: Send + Sync {
    /// Rated contests of the given domains, oldest first.
    async fn list_rated_contests(&self, domain_ids: &[String]) -> Result<Vec<Contest>>;

    async fn find_contest(&self, domain_id: &str, contest_id: Uuid) -> Result<Option<Contest>>;

    async fn count_statuses(&self, domain_id: &str, contest_id: Uuid) -> Result<i64>;

    /// Participants with a journal, in stored standing order.
    async fn list_statuses(&self, domain_id: &str, contest_id: Uuid) -> Result<Vec<ContestStatus>>;

    async fn write_standings(&self, domain_id: &str, contest_id: Uuid, updates: &[StandingUpdate]) -> Result<u64>;

    async fn create_contest(&self, contest: &NewContest) -> Result<Contest>;
}

#[async_trait::async_trait]
pub trait DomainStore: Send + Sync {
    async fn list_domain_ids(&self) -> Result<Vec<String>>;

    /// Clears every user's points and rank, then writes `update`, atomically.
    async fn replace_points(&self, domain_id: &str, update: &PointsUpdate) -> Result<u64>;

    /// Clears every codelink rank, then writes `ranks`, atomically.
    async fn replace_codelink_ranks(&self, domain_id: &str, ranks: &[(Uid, i64)]) -> Result<u64>;

    /// Point descending, point-less users last, then by uid.
    async fn list_rank_candidates(
        &self,
        domain_id: &str,
        excluded_uids: &[Uid],
        uid_cutoff: Uid,
    ) -> Result<Vec<(Uid, Option<i64>)>>;

    async fn list_with_point(&self, domain_id: &str, uids: &[Uid]) -> Result<Vec<(Uid, i64)>>;

    async fn list_ranking_page(
        &self,
        domain_id: &str,
        pagination: &PaginationParams,
    ) -> Result<(Vec<DomainUser>, i64)>;
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_users(&self, uids: &[Uid]) -> Result<HashMap<Uid, User>>;

    async fn find_group(&self, domain_id: &str, name: &str) -> Result<Option<Group>>;

    async fn find_problems(&self, domain_id: &str, pids: &[ProblemId]) -> Result<HashMap<ProblemId, Problem>>;
}

/// Everything the jobs read and write.
pub trait Store: ContestStore + DomainStore + UserStore {}

impl<T: ContestStore + DomainStore + UserStore> Store for T {}
