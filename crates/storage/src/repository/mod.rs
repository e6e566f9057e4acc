pub mod contest;
pub mod domain_user;
pub mod group;
pub mod problem;
pub mod status;
pub mod user;

pub use contest::ContestRepository;
pub use domain_user::DomainUserRepository;
pub use group::GroupRepository;
pub use problem::ProblemRepository;
pub use status::StatusRepository;
pub use user::UserRepository;
