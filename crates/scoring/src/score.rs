use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use storage::models::Verdict;

use crate::profile::{ProblemScoreProfile, WRONG_ATTEMPT_PENALTY};

/// Time since contest start, truncated two ways: whole seconds for the
/// recorded penalty time and whole minutes for score decay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed {
    pub seconds: i64,
    pub minutes: i64,
}

impl Elapsed {
    pub fn between(begin_at: DateTime<Utc>, at: DateTime<Utc>) -> Self {
        let millis = (at - begin_at).num_milliseconds();
        Self {
            seconds: millis.div_euclid(1000),
            minutes: millis.div_euclid(60 * 1000),
        }
    }
}

/// Score of a single judged event.
///
/// Only accepted events earn points:
/// `max(minimum, base - minutes * decay - wrong_attempts * 50)`.
pub fn score(
    profile: &ProblemScoreProfile,
    elapsed_minutes: i64,
    wrong_attempts: u32,
    verdict: Verdict,
) -> Decimal {
    if !verdict.is_accepted() {
        return Decimal::ZERO;
    }

    let decayed = profile.base
        - elapsed_minutes * profile.decay_per_minute
        - i64::from(wrong_attempts) * WRONG_ATTEMPT_PENALTY;
    Decimal::from(decayed.max(profile.minimum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CODELINK_PROFILES;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_decay_and_attempt_penalty() {
        let profile = ProblemScoreProfile::new(1000, 300, 4);
        assert_eq!(score(&profile, 10, 2, Verdict::Accepted), Decimal::from(860));
    }

    #[test]
    fn test_score_never_drops_below_minimum() {
        let profile = CODELINK_PROFILES[1];
        assert_eq!(score(&profile, 300, 10, Verdict::Accepted), Decimal::from(450));
    }

    #[test]
    fn test_rejected_verdicts_score_zero() {
        let profile = CODELINK_PROFILES[0];
        assert_eq!(score(&profile, 1, 0, Verdict::WrongAnswer), Decimal::ZERO);
        assert_eq!(score(&profile, 1, 0, Verdict::CompileError), Decimal::ZERO);
    }

    #[test]
    fn test_elapsed_truncates_seconds_and_minutes_separately() {
        let begin = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let at = begin + Duration::milliseconds(119_999);
        let elapsed = Elapsed::between(begin, at);
        assert_eq!(elapsed.seconds, 119);
        assert_eq!(elapsed.minutes, 1);
    }

    #[test]
    fn test_elapsed_before_start_floors_downward() {
        let begin = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let elapsed = Elapsed::between(begin, begin - Duration::milliseconds(500));
        assert_eq!(elapsed.seconds, -1);
        assert_eq!(elapsed.minutes, -1);
    }
}
