use sqlx::PgPool;
use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Problem, ProblemId};

pub struct ProblemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProblemRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_many(&self, domain_id: &str, pids: &[ProblemId]) -> Result<HashMap<ProblemId, Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            "SELECT domain_id, pid, title FROM problems WHERE domain_id = $1 AND pid = ANY($2)",
        )
        .bind(domain_id)
        .bind(pids)
        .fetch_all(self.pool)
        .await?;

        Ok(problems.into_iter().map(|p| (p.pid, p)).collect())
    }
}
