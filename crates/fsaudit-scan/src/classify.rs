//! Record classification: routing inventory records into buckets
//!
//! Single pass, no state carried between lines. A malformed line aborts the
//! run; downstream bucket counts would be unreliable otherwise.

use std::io::{BufRead, Write};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::bucket::{Bucket, BucketSink};
use crate::error::ScanError;
use crate::record::{FileKind, InventoryRecord};

/// Lines between progress reports
const PROGRESS_EVERY: u64 = 10_000_000;

/// Expected ownership and permission baselines. A record is flagged when it
/// deviates from these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyPolicy {
    /// Expected owning uid
    pub uid: String,
    /// Expected owning gid
    pub gid: String,
    /// Expected permission string for regular files
    pub file_perms: String,
    /// Expected permission string for directories
    pub dir_perms: String,
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self {
            uid: "34076".to_string(),
            gid: "1363".to_string(),
            file_perms: "-r--r--r--".to_string(),
            dir_perms: "-r-xr-xr-x".to_string(),
        }
    }
}

/// Counters for one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Report lines consumed
    pub lines: u64,
    /// Records the operation selected (all routed records for a full
    /// classification, immutable directories for the filter)
    pub selected: u64,
}

/// Routes parsed records into classification buckets against a policy
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    policy: ClassifyPolicy,
}

impl Classifier {
    /// Create a classifier for the given policy
    pub fn new(policy: ClassifyPolicy) -> Self {
        Self { policy }
    }

    /// Route one record. `line_no` is only used in errors.
    ///
    /// Symlinks are tallied count-only and skip the lock and ownership
    /// checks. Records with no type flag still take both. A gid mismatch is
    /// recorded only when the uid matches; the exclusivity is inherited
    /// behavior, kept as-is.
    pub fn route<S: BucketSink>(
        &self,
        record: &InventoryRecord<'_>,
        line_no: u64,
        sink: &mut S,
    ) -> Result<(), ScanError> {
        match record.kind() {
            Some(FileKind::File) => {
                sink.emit(Bucket::Files, record.path)?;
                if record.perms != self.policy.file_perms {
                    sink.emit(Bucket::FilePerms, record.path)?;
                }
            }
            Some(FileKind::Directory) => {
                sink.emit(Bucket::Dirs, record.path)?;
                if record.perms != self.policy.dir_perms {
                    sink.emit(Bucket::DirPerms, record.path)?;
                }
            }
            Some(FileKind::Symlink) => {
                sink.emit(Bucket::Symlinks, "")?;
                return Ok(());
            }
            Some(FileKind::Other) => {
                return Err(ScanError::InvalidFileType {
                    line: line_no,
                    flags: record.flags.to_string(),
                });
            }
            None => {}
        }

        if record.is_locked() {
            sink.emit(Bucket::Locked, record.path)?;
        } else {
            sink.emit(Bucket::Unlocked, record.path)?;
        }

        if record.uid != self.policy.uid {
            sink.emit(Bucket::Ownership, record.path)?;
        } else if record.gid != self.policy.gid {
            sink.emit(Bucket::Ownership, record.path)?;
        }

        Ok(())
    }

    /// Classify an entire report stream into `sink`.
    pub fn classify_lines<R: BufRead, S: BucketSink>(
        &self,
        reader: R,
        sink: &mut S,
    ) -> Result<ScanStats, ScanError> {
        let mut stats = ScanStats::default();
        let started = Instant::now();
        for line in reader.lines() {
            let line = line?;
            stats.lines += 1;
            let record = InventoryRecord::parse(&line, stats.lines)?;
            self.route(&record, stats.lines, sink)?;
            stats.selected += 1;
            if stats.lines % PROGRESS_EVERY == 0 {
                tracing::info!(
                    lines = stats.lines,
                    elapsed_secs = started.elapsed().as_secs(),
                    "classification progress"
                );
            }
        }
        Ok(stats)
    }
}

/// Does the record carry both the directory flag and the lock flag?
///
/// Flag membership, not [`InventoryRecord::kind`]: a record whose flags hold
/// both `F` and `D` still matches, mirroring how the policy-run output has
/// always been filtered.
pub fn is_immutable_dir(record: &InventoryRecord<'_>) -> bool {
    record.flags.contains('D') && record.is_locked()
}

/// Stream the report, writing the path of every immutable directory to
/// `out`, one per line. This is the candidate list the path reducer
/// consumes.
pub fn filter_immutable_dirs<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
) -> Result<ScanStats, ScanError> {
    let mut stats = ScanStats::default();
    let started = Instant::now();
    for line in reader.lines() {
        let line = line?;
        stats.lines += 1;
        let record = InventoryRecord::parse(&line, stats.lines)?;
        if is_immutable_dir(&record) {
            out.write_all(record.path.as_bytes())?;
            out.write_all(b"\n")?;
            stats.selected += 1;
        }
        if stats.lines % PROGRESS_EVERY == 0 {
            tracing::info!(
                lines = stats.lines,
                matched = stats.selected,
                elapsed_secs = started.elapsed().as_secs(),
                "immutable-dir filter progress"
            );
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::MemorySink;
    use std::io::Cursor;

    fn record(uid: &'static str, gid: &'static str, perms: &'static str, flags: &'static str, path: &'static str) -> InventoryRecord<'static> {
        InventoryRecord {
            inode: "1",
            na1: "0",
            na2: "0",
            uid,
            gid,
            perms,
            flags,
            path,
        }
    }

    fn classifier() -> Classifier {
        Classifier::new(ClassifyPolicy::default())
    }

    #[test]
    fn file_with_matching_perms_only_in_files() {
        let mut sink = MemorySink::new();
        let rec = record("34076", "1363", "-r--r--r--", "F", "/srv/a");
        classifier().route(&rec, 1, &mut sink).unwrap();
        assert_eq!(sink.bucket(Bucket::Files), ["/srv/a"]);
        assert_eq!(sink.count(Bucket::FilePerms), 0);
        assert_eq!(sink.bucket(Bucket::Unlocked), ["/srv/a"]);
        assert_eq!(sink.count(Bucket::Ownership), 0);
    }

    #[test]
    fn deviant_dir_perms_flagged() {
        let mut sink = MemorySink::new();
        let rec = record("34076", "1363", "drwxrwxrwx", "DX", "/srv/d");
        classifier().route(&rec, 1, &mut sink).unwrap();
        assert_eq!(sink.bucket(Bucket::Dirs), ["/srv/d"]);
        assert_eq!(sink.bucket(Bucket::DirPerms), ["/srv/d"]);
        assert_eq!(sink.bucket(Bucket::Locked), ["/srv/d"]);
    }

    #[test]
    fn symlinks_are_count_only_and_skip_other_buckets() {
        let mut sink = MemorySink::new();
        let rec = record("0", "0", "lrwxrwxrwx", "LX", "/srv/link");
        classifier().route(&rec, 1, &mut sink).unwrap();
        assert_eq!(sink.bucket(Bucket::Symlinks), [""]);
        assert_eq!(sink.count(Bucket::Locked), 0);
        assert_eq!(sink.count(Bucket::Ownership), 0);
    }

    #[test]
    fn other_type_is_fatal() {
        let mut sink = MemorySink::new();
        let rec = record("0", "0", "----------", "O", "/srv/odd");
        let err = classifier().route(&rec, 9, &mut sink).unwrap_err();
        assert!(matches!(err, ScanError::InvalidFileType { line: 9, .. }));
    }

    #[test]
    fn gid_mismatch_shadowed_by_uid_mismatch() {
        // Inherited exclusivity: both mismatched still yields one entry,
        // and a gid mismatch alone is only seen when the uid matches.
        let mut sink = MemorySink::new();
        let both = record("999", "999", "-r--r--r--", "F", "/srv/both");
        classifier().route(&both, 1, &mut sink).unwrap();
        assert_eq!(sink.bucket(Bucket::Ownership), ["/srv/both"]);

        let gid_only = record("34076", "999", "-r--r--r--", "F", "/srv/gid");
        classifier().route(&gid_only, 2, &mut sink).unwrap();
        assert_eq!(sink.bucket(Bucket::Ownership), ["/srv/both", "/srv/gid"]);
    }

    #[test]
    fn untyped_record_still_lock_and_ownership_checked() {
        let mut sink = MemorySink::new();
        let rec = record("999", "1363", "----------", "uX", "/srv/odd");
        classifier().route(&rec, 1, &mut sink).unwrap();
        assert_eq!(sink.bucket(Bucket::Locked), ["/srv/odd"]);
        assert_eq!(sink.bucket(Bucket::Ownership), ["/srv/odd"]);
        assert_eq!(sink.count(Bucket::Files), 0);
        assert_eq!(sink.count(Bucket::Dirs), 0);
    }

    #[test]
    fn classify_lines_aborts_on_malformed() {
        let input = "1 0 0 34076 1363 -r--r--r-- F -- /srv/ok\nbad line\n";
        let mut sink = MemorySink::new();
        let err = classifier()
            .classify_lines(Cursor::new(input), &mut sink)
            .unwrap_err();
        assert!(matches!(err, ScanError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn filter_emits_only_locked_dirs() {
        let input = "\
1 0 0 1 1 -r--r--r-- F -- /srv/file
2 0 0 1 1 dr-xr-xr-x DX -- /srv/frozen
3 0 0 1 1 drwxr-xr-x D -- /srv/thawed
4 0 0 1 1 dr-xr-xr-x DXu -- /srv/frozen/child
";
        let mut out = Vec::new();
        let stats = filter_immutable_dirs(Cursor::new(input), &mut out).unwrap();
        assert_eq!(stats.lines, 4);
        assert_eq!(stats.selected, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/srv/frozen\n/srv/frozen/child\n"
        );
    }
}
