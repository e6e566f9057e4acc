pub mod error;
pub mod first_blood;
pub mod format;
pub mod journal;
pub mod profile;
pub mod ranking;
pub mod rule;
pub mod score;
pub mod scoreboard;

pub use error::{Result, ScoringError};
pub use first_blood::FirstBlood;
pub use journal::{ContestStat, NormalizeOptions, normalize};
pub use profile::{CODELINK_PROFILES, ProblemScoreProfile, ScoreTable};
pub use ranking::{Standing, rank, rank_by};
pub use rule::{CodelinkRule, RankedContest, RankedStatus};
pub use scoreboard::{Cell, CellKind, Highlight, ProblemStat, Row, Scoreboard, ScoreboardConfig};
