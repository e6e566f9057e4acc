use sqlx::PgPool;

use crate::error::Result;
use crate::models::Group;

pub struct GroupRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GroupRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_name(&self, domain_id: &str, name: &str) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            "SELECT domain_id, name, uids FROM user_groups WHERE domain_id = $1 AND name = $2",
        )
        .bind(domain_id)
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(group)
    }
}
