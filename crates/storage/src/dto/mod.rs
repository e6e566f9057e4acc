pub mod common;
pub mod matches;
pub mod ranking;
