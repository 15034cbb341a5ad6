//! fsaudit test and validation infrastructure
//!
//! Cross-crate pipeline tests: synthetic inventory reports driven through
//! the classifier and the path reducer end to end, plus a tempdir harness
//! for tests that touch the filesystem.

pub mod harness;
pub mod pipeline;

pub use harness::TestEnv;
pub use pipeline::{synthetic_report, ReportSpec};
