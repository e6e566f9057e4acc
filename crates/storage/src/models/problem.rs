use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::journal::ProblemId;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Problem {
    pub domain_id: String,
    pub pid: ProblemId,
    pub title: String,
}
