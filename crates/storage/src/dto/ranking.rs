use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Uid;

/// One row of the domain-wide codelink ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodelinkRankingEntry {
    pub uid: Uid,
    pub uname: String,
    pub point: Option<i64>,
    pub codelink_rank: Option<i64>,
    pub point_info: BTreeMap<String, i64>,
}
