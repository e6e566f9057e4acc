use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::journal::{ProblemId, Uid};

pub const CODELINK_RULE: &str = "codelink";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Contest {
    pub contest_id: Uuid,
    pub domain_id: String,
    pub title: String,
    pub content: String,
    pub owner: Uid,
    pub rule: String,
    pub begin_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Scoreboard freeze instant
    pub lock_at: Option<DateTime<Utc>>,
    pub unlocked: bool,
    /// Problem slots in display order
    pub pids: Vec<ProblemId>,
    pub rated: bool,
    pub assign: Vec<String>,
    pub maintainer: Vec<Uid>,
    pub langs: Vec<String>,
    pub allow_view_code: bool,
    pub auto_hide: bool,
    pub duration: Option<f64>,
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Contest {
    /// The scoreboard is frozen when a lock time is set, has passed, and the
    /// contest has not been explicitly unlocked.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        match self.lock_at {
            Some(lock_at) => now > lock_at && !self.unlocked,
            None => false,
        }
    }

    /// Lock instant to apply to journals right now, if any.
    pub fn effective_lock(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.is_locked(now) { self.lock_at } else { None }
    }

    pub fn is_done(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_at
    }

    /// Slot index of a problem within this contest
    pub fn slot_of(&self, pid: ProblemId) -> Option<usize> {
        self.pids.iter().position(|p| *p == pid)
    }
}

/// Insertable form of a contest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContest {
    pub domain_id: String,
    pub title: String,
    pub content: String,
    pub owner: Uid,
    pub rule: String,
    pub begin_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub lock_at: Option<DateTime<Utc>>,
    pub pids: Vec<ProblemId>,
    pub rated: bool,
    pub assign: Vec<String>,
    pub maintainer: Vec<Uid>,
    pub langs: Vec<String>,
    pub allow_view_code: bool,
    pub auto_hide: bool,
    pub duration: Option<f64>,
    pub code: Option<String>,
}

impl NewContest {
    /// Copies every setting of `template` except title and assignment.
    pub fn from_template(template: &Contest, title: String, assign: Vec<String>) -> Self {
        Self {
            domain_id: template.domain_id.clone(),
            title,
            content: template.content.clone(),
            owner: template.owner,
            rule: template.rule.clone(),
            begin_at: template.begin_at,
            end_at: template.end_at,
            lock_at: template.lock_at,
            pids: template.pids.clone(),
            rated: true,
            assign,
            maintainer: template.maintainer.clone(),
            langs: template.langs.clone(),
            allow_view_code: template.allow_view_code,
            auto_hide: template.auto_hide,
            duration: template.duration,
            code: template.code.clone(),
        }
    }

    pub fn into_contest(self, contest_id: Uuid, created_at: DateTime<Utc>) -> Contest {
        Contest {
            contest_id,
            domain_id: self.domain_id,
            title: self.title,
            content: self.content,
            owner: self.owner,
            rule: self.rule,
            begin_at: self.begin_at,
            end_at: self.end_at,
            lock_at: self.lock_at,
            unlocked: false,
            pids: self.pids,
            rated: self.rated,
            assign: self.assign,
            maintainer: self.maintainer,
            langs: self.langs,
            allow_view_code: self.allow_view_code,
            auto_hide: self.auto_hide,
            duration: self.duration,
            code: self.code,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn contest(lock_at: Option<DateTime<Utc>>, unlocked: bool) -> Contest {
        let begin_at = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        NewContest {
            domain_id: "system".to_string(),
            title: "Weekly".to_string(),
            content: String::new(),
            owner: 2,
            rule: CODELINK_RULE.to_string(),
            begin_at,
            end_at: begin_at + Duration::hours(2),
            lock_at,
            pids: vec![11, 12, 13],
            rated: true,
            assign: Vec::new(),
            maintainer: Vec::new(),
            langs: Vec::new(),
            allow_view_code: false,
            auto_hide: false,
            duration: None,
            code: None,
        }
        .into_contest(Uuid::new_v4(), begin_at)
        .with_unlocked(unlocked)
    }

    impl Contest {
        fn with_unlocked(mut self, unlocked: bool) -> Self {
            self.unlocked = unlocked;
            self
        }
    }

    #[test]
    fn test_lock_applies_only_after_lock_time() {
        let lock_at = Utc.with_ymd_and_hms(2025, 5, 1, 10, 30, 0).unwrap();
        let c = contest(Some(lock_at), false);
        assert!(!c.is_locked(lock_at - Duration::minutes(1)));
        assert!(c.is_locked(lock_at + Duration::minutes(1)));
        assert_eq!(c.effective_lock(lock_at + Duration::minutes(1)), Some(lock_at));
    }

    #[test]
    fn test_unlocked_contest_is_not_frozen() {
        let lock_at = Utc.with_ymd_and_hms(2025, 5, 1, 10, 30, 0).unwrap();
        let c = contest(Some(lock_at), true);
        assert!(!c.is_locked(lock_at + Duration::hours(5)));
        assert_eq!(c.effective_lock(lock_at + Duration::hours(5)), None);
    }

    #[test]
    fn test_slot_of() {
        let c = contest(None, false);
        assert_eq!(c.slot_of(12), Some(1));
        assert_eq!(c.slot_of(99), None);
    }
}
