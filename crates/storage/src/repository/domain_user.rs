use sqlx::PgPool;

use crate::dto::common::PaginationParams;
use crate::error::Result;
use crate::models::{DomainUser, PointsUpdate, Uid};

const DOMAIN_USER_COLUMNS: &str = "domain_id, uid, point_info, point, codelink_rank";

/// Repository for per-domain user records (points and codelink rank)
pub struct DomainUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DomainUserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_domain_ids(&self) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>("SELECT domain_id FROM domains ORDER BY domain_id")
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// Replaces the breakdown, total point and codelink rank of every user
    /// in the domain. Either the whole update lands or nothing does.
    pub async fn replace_points(&self, domain_id: &str, update: &PointsUpdate) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        self.reset_points(domain_id, &mut tx).await?;
        for (point_type, values) in &update.point_info {
            self.set_point_info(domain_id, point_type, values, &mut tx).await?;
        }
        let written = self.upsert_points(domain_id, &update.points, &mut tx).await?;
        self.reset_codelink_ranks(domain_id, &mut tx).await?;
        self.set_codelink_ranks(domain_id, &update.codelink_ranks, &mut tx).await?;

        tx.commit().await?;
        Ok(written)
    }

    /// Clears every codelink rank of the domain and writes `ranks` in one
    /// transaction.
    pub async fn replace_codelink_ranks(&self, domain_id: &str, ranks: &[(Uid, i64)]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        self.reset_codelink_ranks(domain_id, &mut tx).await?;
        let written = self.set_codelink_ranks(domain_id, ranks, &mut tx).await?;

        tx.commit().await?;
        Ok(written)
    }

    /// Candidates for the codelink rank pass, ordered by point descending
    /// with point-less users last.
    pub async fn list_rank_candidates(
        &self,
        domain_id: &str,
        excluded_uids: &[Uid],
        uid_cutoff: Uid,
    ) -> Result<Vec<(Uid, Option<i64>)>> {
        let rows = sqlx::query_as::<_, (Uid, Option<i64>)>(
            r#"
            SELECT uid, point
            FROM domain_users
            WHERE domain_id = $1 AND NOT (uid = ANY($2)) AND uid > $3
            ORDER BY point DESC NULLS LAST, uid ASC
            "#,
        )
        .bind(domain_id)
        .bind(excluded_uids)
        .bind(uid_cutoff)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Users among `uids` that currently hold a point.
    pub async fn list_with_point(&self, domain_id: &str, uids: &[Uid]) -> Result<Vec<(Uid, i64)>> {
        let rows = sqlx::query_as::<_, (Uid, i64)>(
            r#"
            SELECT uid, point
            FROM domain_users
            WHERE domain_id = $1 AND uid = ANY($2) AND point IS NOT NULL
            "#,
        )
        .bind(domain_id)
        .bind(uids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// One page of the domain ranking (regular users only) and the total count.
    pub async fn list_ranking_page(
        &self,
        domain_id: &str,
        pagination: &PaginationParams,
    ) -> Result<(Vec<DomainUser>, i64)> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM domain_users WHERE domain_id = $1 AND uid > 1",
        )
        .bind(domain_id)
        .fetch_one(self.pool)
        .await?;

        let sql = format!(
            r#"
            SELECT {DOMAIN_USER_COLUMNS}
            FROM domain_users
            WHERE domain_id = $1 AND uid > 1
            ORDER BY point DESC NULLS LAST, uid ASC
            LIMIT $2 OFFSET $3
            "#
        );
        let users = sqlx::query_as::<_, DomainUser>(&sql)
            .bind(domain_id)
            .bind(pagination.limit() as i64)
            .bind(i64::try_from(pagination.offset()).unwrap_or(i64::MAX))
            .fetch_all(self.pool)
            .await?;

        Ok((users, total))
    }

    async fn reset_points(&self, domain_id: &str, tx: &mut sqlx::Transaction<'_, sqlx::Postgres>) -> Result<()> {
        sqlx::query("UPDATE domain_users SET point_info = '{}'::jsonb, point = NULL WHERE domain_id = $1")
            .bind(domain_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Sets `point_info.<point_type>` for existing domain users.
    async fn set_point_info(
        &self,
        domain_id: &str,
        point_type: &str,
        values: &[(Uid, i64)],
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let (uids, points): (Vec<Uid>, Vec<i64>) = values.iter().copied().unzip();

        sqlx::query(
            r#"
            UPDATE domain_users AS d
            SET point_info = jsonb_set(d.point_info, ARRAY[$2::text], to_jsonb(u.value))
            FROM UNNEST($3::bigint[], $4::bigint[]) AS u(uid, value)
            WHERE d.domain_id = $1 AND d.uid = u.uid
            "#,
        )
        .bind(domain_id)
        .bind(point_type)
        .bind(&uids)
        .bind(&points)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn upsert_points(
        &self,
        domain_id: &str,
        values: &[(Uid, i64)],
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<u64> {
        if values.is_empty() {
            return Ok(0);
        }
        let (uids, points): (Vec<Uid>, Vec<i64>) = values.iter().copied().unzip();

        let result = sqlx::query(
            r#"
            INSERT INTO domain_users (domain_id, uid, point)
            SELECT $1, u.uid, u.point
            FROM UNNEST($2::bigint[], $3::bigint[]) AS u(uid, point)
            ON CONFLICT (domain_id, uid) DO UPDATE SET point = EXCLUDED.point
            "#,
        )
        .bind(domain_id)
        .bind(&uids)
        .bind(&points)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn reset_codelink_ranks(
        &self,
        domain_id: &str,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<()> {
        sqlx::query("UPDATE domain_users SET codelink_rank = NULL WHERE domain_id = $1")
            .bind(domain_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn set_codelink_ranks(
        &self,
        domain_id: &str,
        ranks: &[(Uid, i64)],
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> Result<u64> {
        if ranks.is_empty() {
            return Ok(0);
        }
        let (uids, values): (Vec<Uid>, Vec<i64>) = ranks.iter().copied().unzip();

        let result = sqlx::query(
            r#"
            UPDATE domain_users AS d
            SET codelink_rank = u.codelink_rank
            FROM UNNEST($2::bigint[], $3::bigint[]) AS u(uid, codelink_rank)
            WHERE d.domain_id = $1 AND d.uid = u.uid
            "#,
        )
        .bind(domain_id)
        .bind(&uids)
        .bind(&values)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}
