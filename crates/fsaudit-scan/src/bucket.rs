//! Classification output buckets and their sinks
//!
//! Each bucket is a flat file of paths, one per line, written incrementally.
//! Handles are scoped to the sink: acquired when the sink is built, flushed
//! by `finish`, and closed on every exit path when the sink drops. Nothing
//! is held as ambient state.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The named classification buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// All regular files
    Files,
    /// Files whose permissions differ from policy
    FilePerms,
    /// All directories
    Dirs,
    /// Directories whose permissions differ from policy
    DirPerms,
    /// Symlink tally; entries are blank lines, the list is count-only
    Symlinks,
    /// Records carrying the immutable/locked flag
    Locked,
    /// Records without the immutable/locked flag
    Unlocked,
    /// Records whose ownership differs from policy
    Ownership,
}

impl Bucket {
    /// Every bucket, in output-file order
    pub const ALL: [Bucket; 8] = [
        Bucket::Dirs,
        Bucket::DirPerms,
        Bucket::Files,
        Bucket::FilePerms,
        Bucket::Locked,
        Bucket::Ownership,
        Bucket::Symlinks,
        Bucket::Unlocked,
    ];

    /// File name of this bucket under the output directory
    pub fn file_name(self) -> &'static str {
        match self {
            Bucket::Files => "files",
            Bucket::FilePerms => "fileperms",
            Bucket::Dirs => "dirs",
            Bucket::DirPerms => "dirperms",
            Bucket::Symlinks => "symlinks",
            Bucket::Locked => "locked",
            Bucket::Unlocked => "unlocked",
            Bucket::Ownership => "ownership",
        }
    }
}

/// Destination for classified paths. The classifier writes through this
/// seam, so tests can collect in memory while production writes files.
pub trait BucketSink {
    /// Append one entry to a bucket
    fn emit(&mut self, bucket: Bucket, path: &str) -> io::Result<()>;
}

/// One buffered file per bucket under an output directory
#[derive(Debug)]
pub struct FileBucketSink {
    writers: HashMap<Bucket, BufWriter<File>>,
    dir: PathBuf,
}

impl FileBucketSink {
    /// Create the output directory if necessary and open every bucket file,
    /// truncating previous contents.
    pub fn create(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let mut writers = HashMap::with_capacity(Bucket::ALL.len());
        for bucket in Bucket::ALL {
            let file = File::create(dir.join(bucket.file_name()))?;
            writers.insert(bucket, BufWriter::new(file));
        }
        Ok(Self {
            writers,
            dir: dir.to_path_buf(),
        })
    }

    /// Directory the bucket files live in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Flush every bucket. Call before dropping so write errors surface
    /// instead of being swallowed by drop.
    pub fn finish(mut self) -> io::Result<()> {
        for writer in self.writers.values_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl BucketSink for FileBucketSink {
    fn emit(&mut self, bucket: Bucket, path: &str) -> io::Result<()> {
        // Every bucket is opened in create(), so the lookup cannot miss.
        let writer = self
            .writers
            .get_mut(&bucket)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, bucket.file_name()))?;
        writer.write_all(path.as_bytes())?;
        writer.write_all(b"\n")
    }
}

/// In-memory sink for tests and small runs
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: HashMap<Bucket, Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries collected for a bucket, in emission order
    pub fn bucket(&self, bucket: Bucket) -> &[String] {
        self.entries.get(&bucket).map_or(&[], Vec::as_slice)
    }

    /// Number of entries in a bucket
    pub fn count(&self, bucket: Bucket) -> usize {
        self.bucket(bucket).len()
    }
}

impl BucketSink for MemorySink {
    fn emit(&mut self, bucket: Bucket, path: &str) -> io::Result<()> {
        self.entries
            .entry(bucket)
            .or_default()
            .push(path.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_writes_one_file_per_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("buckets");
        let mut sink = FileBucketSink::create(&out).unwrap();
        sink.emit(Bucket::Dirs, "/srv/a").unwrap();
        sink.emit(Bucket::Dirs, "/srv/b").unwrap();
        sink.emit(Bucket::Symlinks, "").unwrap();
        sink.finish().unwrap();

        let dirs = std::fs::read_to_string(out.join("dirs")).unwrap();
        assert_eq!(dirs, "/srv/a\n/srv/b\n");
        let symlinks = std::fs::read_to_string(out.join("symlinks")).unwrap();
        assert_eq!(symlinks, "\n");
        for bucket in Bucket::ALL {
            assert!(out.join(bucket.file_name()).exists());
        }
    }

    #[test]
    fn memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        sink.emit(Bucket::Locked, "/x").unwrap();
        sink.emit(Bucket::Locked, "/y").unwrap();
        assert_eq!(sink.bucket(Bucket::Locked), ["/x", "/y"]);
        assert_eq!(sink.count(Bucket::Unlocked), 0);
    }
}
