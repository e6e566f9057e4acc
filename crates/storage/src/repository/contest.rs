use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{Contest, NewContest};

const CONTEST_COLUMNS: &str = r#"
    contest_id, domain_id, title, content, owner, rule, begin_at, end_at, lock_at,
    unlocked, pids, rated, assign, maintainer, langs, allow_view_code, auto_hide,
    duration, code, created_at
"#;

/// Repository for contest documents
pub struct ContestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContestRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_optional(&self, domain_id: &str, contest_id: Uuid) -> Result<Option<Contest>> {
        let sql = format!(
            "SELECT {CONTEST_COLUMNS} FROM contests WHERE domain_id = $1 AND contest_id = $2"
        );
        let contest = sqlx::query_as::<_, Contest>(&sql)
            .bind(domain_id)
            .bind(contest_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(contest)
    }

    /// Rated contests of the given domains, oldest first
    pub async fn list_rated(&self, domain_ids: &[String]) -> Result<Vec<Contest>> {
        let sql = format!(
            r#"
            SELECT {CONTEST_COLUMNS}
            FROM contests
            WHERE domain_id = ANY($1) AND rated = TRUE
            ORDER BY begin_at ASC, contest_id ASC
            "#
        );
        let contests = sqlx::query_as::<_, Contest>(&sql)
            .bind(domain_ids)
            .fetch_all(self.pool)
            .await?;

        Ok(contests)
    }

    pub async fn create(&self, contest: &NewContest) -> Result<Contest> {
        let contest_id = Uuid::now_v7();
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO contests (
                contest_id, domain_id, title, content, owner, rule, begin_at, end_at, lock_at,
                pids, rated, assign, maintainer, langs, allow_view_code, auto_hide,
                duration, code, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(contest_id)
        .bind(&contest.domain_id)
        .bind(&contest.title)
        .bind(&contest.content)
        .bind(contest.owner)
        .bind(&contest.rule)
        .bind(contest.begin_at)
        .bind(contest.end_at)
        .bind(contest.lock_at)
        .bind(&contest.pids)
        .bind(contest.rated)
        .bind(&contest.assign)
        .bind(&contest.maintainer)
        .bind(&contest.langs)
        .bind(contest.allow_view_code)
        .bind(contest.auto_hide)
        .bind(contest.duration)
        .bind(&contest.code)
        .bind(created_at)
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23514") => {
                StorageError::ConstraintViolation(format!(
                    "contest '{}' ends before it begins",
                    contest.title
                ))
            }
            other => StorageError::Database(other),
        })?;

        Ok(contest.clone().into_contest(contest_id, created_at))
    }
}
