use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::journal::Uid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub domain_id: String,
    pub name: String,
    pub uids: Vec<Uid>,
}
