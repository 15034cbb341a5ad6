#![warn(missing_docs)]

//! fsaudit path reduction subsystem: minimal covering sets of directory paths
//!
//! Input: an unordered stream of absolute paths, possibly with duplicates.
//! Output: the smallest subset such that every input path is equal to or a
//! descendant of some member, and no member is an ancestor of another.

pub mod error;
pub mod pathset;
pub mod reduce;

pub use error::PruneError;
pub use pathset::{Insertion, PathSet};
pub use reduce::{MalformedPolicy, ReduceStats, Reducer};
