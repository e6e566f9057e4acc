use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

use super::journal::Uid;

/// A user's standing inside one domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DomainUser {
    pub domain_id: String,
    pub uid: Uid,
    /// Contribution of every point type, keyed by point type name
    #[sqlx(json)]
    pub point_info: BTreeMap<String, i64>,
    pub point: Option<i64>,
    pub codelink_rank: Option<i64>,
}

impl DomainUser {
    pub fn new(domain_id: impl Into<String>, uid: Uid) -> Self {
        Self {
            domain_id: domain_id.into(),
            uid,
            ..Default::default()
        }
    }
}

/// Recomputed points of a whole domain. Everything not listed is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointsUpdate {
    /// Visible contribution per point type name
    pub point_info: Vec<(String, Vec<(Uid, i64)>)>,
    pub points: Vec<(Uid, i64)>,
    pub codelink_ranks: Vec<(Uid, i64)>,
}
