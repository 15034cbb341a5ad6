#![warn(missing_docs)]

//! fsaudit scan subsystem: inventory record parsing and classification
//!
//! Consumes the line-oriented bulk stat dump produced by a clustered
//! filesystem policy run and routes each record into flat-file buckets
//! (type, permission mismatch, lock state, ownership mismatch). The
//! immutable-directory bucket feeds the `fsaudit-prune` reducer.

pub mod bucket;
pub mod classify;
pub mod error;
pub mod record;

pub use bucket::{Bucket, BucketSink, FileBucketSink, MemorySink};
pub use classify::{filter_immutable_dirs, is_immutable_dir, Classifier, ClassifyPolicy, ScanStats};
pub use error::ScanError;
pub use record::{FileKind, InventoryRecord};
