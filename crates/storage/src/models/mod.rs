pub mod contest;
pub mod domain_user;
pub mod group;
pub mod journal;
pub mod problem;
pub mod status;
pub mod user;

pub use contest::{CODELINK_RULE, Contest, NewContest};
pub use domain_user::{DomainUser, PointsUpdate};
pub use group::Group;
pub use journal::{JournalEntry, ProblemId, RecordId, Uid, Verdict};
pub use problem::Problem;
pub use status::{ContestStatus, DetailMap, DisplayEntry, DisplayMap, ProblemDetail, StandingUpdate};
pub use user::{PRIV_USER_PROFILE, User};
