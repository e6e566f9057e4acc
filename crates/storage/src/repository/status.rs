use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{ContestStatus, StandingUpdate, Uid};

/// Repository for per-participant contest status records
pub struct StatusRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatusRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Number of participants that have a journal in the contest
    pub async fn count_with_journal(&self, domain_id: &str, contest_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM contest_status
            WHERE domain_id = $1 AND contest_id = $2 AND journal IS NOT NULL
            "#,
        )
        .bind(domain_id)
        .bind(contest_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Status records with a journal, in stored standing order
    pub async fn list_with_journal(&self, domain_id: &str, contest_id: Uuid) -> Result<Vec<ContestStatus>> {
        let statuses = sqlx::query_as::<_, ContestStatus>(
            r#"
            SELECT domain_id, contest_id, uid, journal, score_sum, accept_count,
                   first_blood_count, time, detail, display
            FROM contest_status
            WHERE domain_id = $1 AND contest_id = $2 AND journal IS NOT NULL
            ORDER BY score_sum DESC, accept_count DESC, first_blood_count DESC, time ASC, uid ASC
            "#,
        )
        .bind(domain_id)
        .bind(contest_id)
        .fetch_all(self.pool)
        .await?;

        Ok(statuses)
    }

    /// Writes recomputed standings for one contest in a single statement.
    pub async fn write_standings(
        &self,
        domain_id: &str,
        contest_id: Uuid,
        updates: &[StandingUpdate],
    ) -> Result<u64> {
        if updates.is_empty() {
            return Ok(0);
        }

        let uids: Vec<Uid> = updates.iter().map(|u| u.uid).collect();
        let score_sums: Vec<Decimal> = updates.iter().map(|u| u.score_sum).collect();
        let accept_counts: Vec<i32> = updates.iter().map(|u| u.accept_count).collect();
        let first_blood_counts: Vec<i32> = updates.iter().map(|u| u.first_blood_count).collect();
        let times: Vec<i64> = updates.iter().map(|u| u.time).collect();
        let details: Vec<Json<_>> = updates.iter().map(|u| Json(&u.detail)).collect();
        let displays: Vec<Json<_>> = updates.iter().map(|u| Json(&u.display)).collect();

        let result = sqlx::query(
            r#"
            UPDATE contest_status AS s
            SET score_sum = u.score_sum,
                accept_count = u.accept_count,
                first_blood_count = u.first_blood_count,
                time = u.time,
                detail = u.detail,
                display = u.display
            FROM UNNEST($3::bigint[], $4::numeric[], $5::int[], $6::int[], $7::bigint[], $8::jsonb[], $9::jsonb[])
                AS u(uid, score_sum, accept_count, first_blood_count, time, detail, display)
            WHERE s.domain_id = $1 AND s.contest_id = $2 AND s.uid = u.uid
            "#,
        )
        .bind(domain_id)
        .bind(contest_id)
        .bind(&uids)
        .bind(&score_sums)
        .bind(&accept_counts)
        .bind(&first_blood_counts)
        .bind(&times)
        .bind(&details)
        .bind(&displays)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
