use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::{NoContext, Timestamp, Uuid, Version};

pub type Uid = i64;
pub type ProblemId = i64;

/// Identifier of a judged submission.
///
/// Record ids are UUIDv7 values, so they sort by creation time and carry the
/// creation instant (millisecond precision) used for elapsed-time and
/// first-blood computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Uuid", into = "Uuid")]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a record id stamped with `time`, truncated to milliseconds.
    pub fn at(time: DateTime<Utc>) -> Self {
        let seconds = time.timestamp().max(0) as u64;
        let ts = Timestamp::from_unix(NoContext, seconds, time.timestamp_subsec_nanos());
        Self(Uuid::new_v7(ts))
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        let (seconds, nanos) = self
            .0
            .get_timestamp()
            .map(|ts| ts.to_unix())
            .unwrap_or((0, 0));
        DateTime::from_timestamp(seconds as i64, nanos).unwrap_or_default()
    }
}

impl TryFrom<Uuid> for RecordId {
    type Error = String;

    fn try_from(value: Uuid) -> Result<Self, Self::Error> {
        match value.get_version() {
            Some(Version::SortRand) => Ok(Self(value)),
            _ => Err(format!("record id {} is not a time-ordered (v7) uuid", value)),
        }
    }
}

impl From<RecordId> for Uuid {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Judge verdict of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Waiting,
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    OutputLimitExceeded,
    RuntimeError,
    CompileError,
    SystemError,
    Canceled,
    Etc,
    Hacked,
    Judging,
    Compiling,
    Fetched,
    Ignored,
    FormatError,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }

    /// Whether the verdict counts as a wrong attempt for the penalty counter.
    pub fn counts_as_attempt(self) -> bool {
        !matches!(
            self,
            Verdict::Accepted | Verdict::CompileError | Verdict::FormatError | Verdict::Canceled
        )
    }
}

/// One judged submission as recorded in a participant's contest journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub rid: RecordId,
    pub pid: ProblemId,
    #[serde(default)]
    pub score: i32,
    pub status: Verdict,
}

impl JournalEntry {
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.rid.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_id_keeps_creation_time() {
        let time = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 15).unwrap();
        let rid = RecordId::at(time);
        assert_eq!(rid.timestamp(), time);
    }

    #[test]
    fn test_record_ids_sort_by_time() {
        let early = RecordId::at(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        let late = RecordId::at(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 1).unwrap());
        assert!(early < late);
    }

    #[test]
    fn test_record_id_rejects_random_uuid() {
        assert!(RecordId::try_from(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_exempt_verdicts_do_not_count() {
        assert!(!Verdict::Accepted.counts_as_attempt());
        assert!(!Verdict::CompileError.counts_as_attempt());
        assert!(!Verdict::FormatError.counts_as_attempt());
        assert!(!Verdict::Canceled.counts_as_attempt());
        assert!(Verdict::WrongAnswer.counts_as_attempt());
        assert!(Verdict::RuntimeError.counts_as_attempt());
    }

    #[test]
    fn test_journal_entry_json_shape() {
        let json = r#"{"rid":"01890a5d-ac96-774b-bcce-b302099a8057","pid":1001,"status":"wrong_answer"}"#;
        let entry: JournalEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.pid, 1001);
        assert_eq!(entry.status, Verdict::WrongAnswer);
        assert_eq!(entry.score, 0);
    }
}
