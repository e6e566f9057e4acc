use sqlx::PgPool;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Uid, User};

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_many(&self, uids: &[Uid]) -> Result<HashMap<Uid, User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT uid, uname, mail, school, display_name, student_id, priv
            FROM users
            WHERE uid = ANY($1)
            "#,
        )
        .bind(uids)
        .fetch_all(self.pool)
        .await?;

        Ok(users.into_iter().map(|u| (u.uid, u)).collect())
    }
}
