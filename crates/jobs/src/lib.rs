pub mod context;
pub mod error;
pub mod matches;
pub mod points;
pub mod ranking;
pub mod report;
pub mod rescore;
pub mod scoreboard;
pub mod settings;
pub mod store;
pub mod traits;

pub use context::{CancelFlag, JobContext};
pub use error::{JobError, Result};
pub use report::{CaseReport, CollectingReporter, Report, Reporter, TracingReporter};
pub use settings::JobSettings;
pub use traits::{ContestStore, DomainStore, Store, UserStore};
