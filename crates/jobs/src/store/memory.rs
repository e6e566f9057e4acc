use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use storage::dto::common::PaginationParams;
use storage::models::{
    Contest, ContestStatus, DomainUser, Group, NewContest, PointsUpdate, Problem, ProblemId, StandingUpdate, Uid,
    User,
};
use storage::{Result, StorageError};
use uuid::Uuid;

use crate::traits::{ContestStore, DomainStore, UserStore};

#[derive(Debug, Default)]
struct MemoryState {
    domains: BTreeSet<String>,
    contests: Vec<Contest>,
    statuses: Vec<ContestStatus>,
    domain_users: BTreeMap<(String, Uid), DomainUser>,
    users: BTreeMap<Uid, User>,
    groups: Vec<Group>,
    problems: BTreeMap<(String, ProblemId), Problem>,
    rejected_titles: HashSet<String>,
}

/// In-process store with the same ordering and update rules as the
/// Postgres repositories. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_domain(&self, domain_id: &str) {
        self.write().domains.insert(domain_id.to_string());
    }

    pub fn add_user(&self, user: User) {
        self.write().users.insert(user.uid, user);
    }

    pub fn add_domain_user(&self, domain_user: DomainUser) {
        let key = (domain_user.domain_id.clone(), domain_user.uid);
        self.write().domain_users.insert(key, domain_user);
    }

    pub fn add_contest(&self, contest: Contest) {
        self.write().contests.push(contest);
    }

    pub fn add_status(&self, status: ContestStatus) {
        self.write().statuses.push(status);
    }

    pub fn add_group(&self, group: Group) {
        self.write().groups.push(group);
    }

    pub fn add_problem(&self, problem: Problem) {
        let key = (problem.domain_id.clone(), problem.pid);
        self.write().problems.insert(key, problem);
    }

    /// Makes `create_contest` fail for contests with this title.
    pub fn reject_contest(&self, title: &str) {
        self.write().rejected_titles.insert(title.to_string());
    }

    pub fn domain_user(&self, domain_id: &str, uid: Uid) -> Option<DomainUser> {
        self.read().domain_users.get(&(domain_id.to_string(), uid)).cloned()
    }

    pub fn domain_users(&self, domain_id: &str) -> Vec<DomainUser> {
        self.read()
            .domain_users
            .values()
            .filter(|d| d.domain_id == domain_id)
            .cloned()
            .collect()
    }

    pub fn contests(&self, domain_id: &str) -> Vec<Contest> {
        self.read()
            .contests
            .iter()
            .filter(|c| c.domain_id == domain_id)
            .cloned()
            .collect()
    }

    pub fn status(&self, contest_id: Uuid, uid: Uid) -> Option<ContestStatus> {
        self.read()
            .statuses
            .iter()
            .find(|s| s.contest_id == contest_id && s.uid == uid)
            .cloned()
    }
}

fn stored_standing_order(a: &ContestStatus, b: &ContestStatus) -> Ordering {
    b.score_sum
        .cmp(&a.score_sum)
        .then_with(|| b.accept_count.cmp(&a.accept_count))
        .then_with(|| b.first_blood_count.cmp(&a.first_blood_count))
        .then_with(|| a.time.cmp(&b.time))
        .then_with(|| a.uid.cmp(&b.uid))
}

fn point_order(a: &Option<i64>, b: &Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn set_ranks(state: &mut MemoryState, domain_id: &str, ranks: &[(Uid, i64)]) -> u64 {
    let mut count = 0;
    for (uid, rank) in ranks {
        if let Some(user) = state.domain_users.get_mut(&(domain_id.to_string(), *uid)) {
            user.codelink_rank = Some(*rank);
            count += 1;
        }
    }
    count
}

#[async_trait::async_trait]
impl ContestStore for MemoryStore {
    async fn list_rated_contests(&self, domain_ids: &[String]) -> Result<Vec<Contest>> {
        let mut contests: Vec<Contest> = self
            .read()
            .contests
            .iter()
            .filter(|c| c.rated && domain_ids.contains(&c.domain_id))
            .cloned()
            .collect();
        contests.sort_by(|a, b| a.begin_at.cmp(&b.begin_at).then_with(|| a.contest_id.cmp(&b.contest_id)));
        Ok(contests)
    }

    async fn find_contest(&self, domain_id: &str, contest_id: Uuid) -> Result<Option<Contest>> {
        Ok(self
            .read()
            .contests
            .iter()
            .find(|c| c.domain_id == domain_id && c.contest_id == contest_id)
            .cloned())
    }

    async fn count_statuses(&self, domain_id: &str, contest_id: Uuid) -> Result<i64> {
        Ok(self
            .read()
            .statuses
            .iter()
            .filter(|s| s.domain_id == domain_id && s.contest_id == contest_id)
            .count() as i64)
    }

    async fn list_statuses(&self, domain_id: &str, contest_id: Uuid) -> Result<Vec<ContestStatus>> {
        let mut statuses: Vec<ContestStatus> = self
            .read()
            .statuses
            .iter()
            .filter(|s| s.domain_id == domain_id && s.contest_id == contest_id)
            .cloned()
            .collect();
        statuses.sort_by(stored_standing_order);
        Ok(statuses)
    }

    async fn write_standings(&self, domain_id: &str, contest_id: Uuid, updates: &[StandingUpdate]) -> Result<u64> {
        let mut state = self.write();
        let mut written = 0;
        for update in updates {
            if let Some(status) = state
                .statuses
                .iter_mut()
                .find(|s| s.domain_id == domain_id && s.contest_id == contest_id && s.uid == update.uid)
            {
                status.apply(update.clone());
                written += 1;
            }
        }
        Ok(written)
    }

    async fn create_contest(&self, contest: &NewContest) -> Result<Contest> {
        let mut state = self.write();
        if contest.end_at < contest.begin_at {
            return Err(StorageError::ConstraintViolation(
                "contest must not end before it begins".to_string(),
            ));
        }
        if state.rejected_titles.contains(&contest.title) {
            return Err(StorageError::ConstraintViolation(format!(
                "contest '{}' was rejected",
                contest.title
            )));
        }

        let created = contest.clone().into_contest(Uuid::now_v7(), Utc::now());
        state.contests.push(created.clone());
        Ok(created)
    }
}

#[async_trait::async_trait]
impl DomainStore for MemoryStore {
    async fn list_domain_ids(&self) -> Result<Vec<String>> {
        Ok(self.read().domains.iter().cloned().collect())
    }

    async fn replace_points(&self, domain_id: &str, update: &PointsUpdate) -> Result<u64> {
        let mut state = self.write();
        for user in state.domain_users.values_mut().filter(|d| d.domain_id == domain_id) {
            user.point_info.clear();
            user.point = None;
            user.codelink_rank = None;
        }

        for (point_type, values) in &update.point_info {
            for (uid, value) in values {
                if let Some(user) = state.domain_users.get_mut(&(domain_id.to_string(), *uid)) {
                    user.point_info.insert(point_type.clone(), *value);
                }
            }
        }
        for (uid, point) in &update.points {
            state
                .domain_users
                .entry((domain_id.to_string(), *uid))
                .or_insert_with(|| DomainUser::new(domain_id, *uid))
                .point = Some(*point);
        }
        set_ranks(&mut state, domain_id, &update.codelink_ranks);

        Ok(update.points.len() as u64)
    }

    async fn replace_codelink_ranks(&self, domain_id: &str, ranks: &[(Uid, i64)]) -> Result<u64> {
        let mut state = self.write();
        for user in state.domain_users.values_mut().filter(|d| d.domain_id == domain_id) {
            user.codelink_rank = None;
        }
        Ok(set_ranks(&mut state, domain_id, ranks))
    }

    async fn list_rank_candidates(
        &self,
        domain_id: &str,
        excluded_uids: &[Uid],
        uid_cutoff: Uid,
    ) -> Result<Vec<(Uid, Option<i64>)>> {
        let mut candidates: Vec<(Uid, Option<i64>)> = self
            .read()
            .domain_users
            .values()
            .filter(|d| d.domain_id == domain_id && !excluded_uids.contains(&d.uid) && d.uid > uid_cutoff)
            .map(|d| (d.uid, d.point))
            .collect();
        candidates.sort_by(|a, b| point_order(&a.1, &b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(candidates)
    }

    async fn list_with_point(&self, domain_id: &str, uids: &[Uid]) -> Result<Vec<(Uid, i64)>> {
        Ok(self
            .read()
            .domain_users
            .values()
            .filter(|d| d.domain_id == domain_id && uids.contains(&d.uid))
            .filter_map(|d| d.point.map(|point| (d.uid, point)))
            .collect())
    }

    async fn list_ranking_page(
        &self,
        domain_id: &str,
        pagination: &PaginationParams,
    ) -> Result<(Vec<DomainUser>, i64)> {
        let mut users: Vec<DomainUser> = self
            .read()
            .domain_users
            .values()
            .filter(|d| d.domain_id == domain_id && d.uid > 1)
            .cloned()
            .collect();
        users.sort_by(|a, b| point_order(&a.point, &b.point).then_with(|| a.uid.cmp(&b.uid)));

        let total = users.len() as i64;
        let page = users
            .into_iter()
            .skip(usize::try_from(pagination.offset()).unwrap_or(usize::MAX))
            .take(pagination.limit() as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn find_users(&self, uids: &[Uid]) -> Result<HashMap<Uid, User>> {
        let state = self.read();
        Ok(uids
            .iter()
            .filter_map(|uid| state.users.get(uid).map(|u| (*uid, u.clone())))
            .collect())
    }

    async fn find_group(&self, domain_id: &str, name: &str) -> Result<Option<Group>> {
        Ok(self
            .read()
            .groups
            .iter()
            .find(|g| g.domain_id == domain_id && g.name == name)
            .cloned())
    }

    async fn find_problems(&self, domain_id: &str, pids: &[ProblemId]) -> Result<HashMap<ProblemId, Problem>> {
        let state = self.read();
        Ok(pids
            .iter()
            .filter_map(|pid| {
                state
                    .problems
                    .get(&(domain_id.to_string(), *pid))
                    .map(|p| (*pid, p.clone()))
            })
            .collect())
    }
}
