use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoringError};

/// Points deducted per wrong attempt before acceptance.
pub const WRONG_ATTEMPT_PENALTY: i64 = 50;

/// Static scoring parameters of one problem slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemScoreProfile {
    pub base: i64,
    pub minimum: i64,
    pub decay_per_minute: i64,
}

impl ProblemScoreProfile {
    pub const fn new(base: i64, minimum: i64, decay_per_minute: i64) -> Self {
        Self {
            base,
            minimum,
            decay_per_minute,
        }
    }

    /// Bonus granted to the first accepted solution: a tenth of the base.
    pub fn first_blood_bonus(&self) -> Decimal {
        Decimal::from(self.base) * Decimal::new(1, 1)
    }
}

/// The fixed five-slot codelink format.
pub const CODELINK_PROFILES: [ProblemScoreProfile; 5] = [
    ProblemScoreProfile::new(1000, 300, 4),
    ProblemScoreProfile::new(1500, 450, 6),
    ProblemScoreProfile::new(2000, 600, 8),
    ProblemScoreProfile::new(2500, 750, 10),
    ProblemScoreProfile::new(3000, 900, 12),
];

/// Score profiles indexed by problem slot. Slots past the end of the table
/// are not scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTable {
    profiles: Vec<ProblemScoreProfile>,
}

impl ScoreTable {
    pub fn new(profiles: Vec<ProblemScoreProfile>) -> Result<Self> {
        for (slot, profile) in profiles.iter().enumerate() {
            if profile.minimum > profile.base {
                return Err(ScoringError::InvalidProfile {
                    slot,
                    base: profile.base,
                    minimum: profile.minimum,
                });
            }
        }
        Ok(Self { profiles })
    }

    pub fn profile(&self, slot: usize) -> Option<&ProblemScoreProfile> {
        self.profiles.get(slot)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            profiles: CODELINK_PROFILES.to_vec(),
        }
    }
}
