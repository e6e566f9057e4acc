//! Domain points: per-type contributions, their sum and the codelink rank.

pub mod aggregate;
pub mod contest;
pub mod rank;

use std::collections::BTreeMap;
use storage::models::Uid;

use crate::context::JobContext;
use crate::error::Result;

pub use aggregate::{run_calc_point, run_calc_point_in_domain};
pub use contest::ContestPoint;
pub use rank::{candidates_after, dense_rank, run_calc_codelink_rank_in_domain};

/// Running contribution of one point type per user.
///
/// Users without an entry are worth the type's base.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointLedger {
    base: i64,
    values: BTreeMap<Uid, i64>,
}

impl PointLedger {
    pub fn new(base: i64) -> Self {
        Self {
            base,
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, uid: Uid) -> i64 {
        self.values.get(&uid).copied().unwrap_or(self.base)
    }

    pub fn set(&mut self, uid: Uid, value: i64) {
        self.values.insert(uid, value);
    }

    pub fn add(&mut self, uid: Uid, delta: i64) {
        let value = self.get(uid) + delta;
        self.set(uid, value);
    }

    /// Users that received an explicit value.
    pub fn uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uid, i64)> + '_ {
        self.values.iter().map(|(uid, value)| (*uid, *value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A source of domain points.
#[async_trait::async_trait]
pub trait PointType: Send + Sync {
    /// Key under `point_info`
    fn name(&self) -> &'static str;

    /// Hidden types are summed but left out of listings.
    fn hidden(&self) -> bool {
        false
    }

    fn base(&self) -> i64 {
        0
    }

    async fn run(&self, ctx: &JobContext, domain_ids: &[String], ledger: &mut PointLedger) -> Result<()>;
}

/// Registered point types, in evaluation order.
pub fn registry() -> Vec<Box<dyn PointType>> {
    vec![Box::new(ContestPoint::default())]
}

/// Names of point types that listings should not show.
pub fn hidden_types() -> Vec<&'static str> {
    registry().iter().filter(|t| t.hidden()).map(|t| t.name()).collect()
}
