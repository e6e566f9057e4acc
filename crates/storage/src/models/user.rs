use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::journal::Uid;

/// Allows the user's profile to appear in domain rankings.
pub const PRIV_USER_PROFILE: i64 = 1 << 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub uid: Uid,
    pub uname: String,
    pub mail: String,
    pub school: Option<String>,
    pub display_name: Option<String>,
    pub student_id: Option<String>,
    #[sqlx(rename = "priv")]
    pub privilege: i64,
}

impl User {
    pub fn has_priv(&self, flag: i64) -> bool {
        self.privilege & flag == flag
    }

    pub fn has_profile(&self) -> bool {
        self.has_priv(PRIV_USER_PROFILE)
    }
}
