//! Streaming reduction driver over a candidate-path source

use std::io::BufRead;
use std::time::Instant;

use crate::error::PruneError;
use crate::pathset::{Insertion, PathSet};

/// Lines between progress reports
const PROGRESS_EVERY: u64 = 50_000;

/// What to do when a candidate path fails validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Log the path at `warn`, count it, and continue (the default)
    #[default]
    Skip,
    /// Fail the run on the first malformed path
    Abort,
}

/// Counters accumulated over one reduction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReduceStats {
    /// Candidate paths offered
    pub lines: u64,
    /// Candidates rejected as malformed (only under [`MalformedPolicy::Skip`])
    pub malformed: u64,
    /// Members displaced by later, more general candidates
    pub replaced: u64,
}

/// Incremental reducer: feeds candidate paths into a [`PathSet`] one at a
/// time. The result is only final at end of input, because a later path can
/// displace earlier members.
#[derive(Debug)]
pub struct Reducer {
    set: PathSet,
    policy: MalformedPolicy,
    stats: ReduceStats,
    started: Instant,
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer {
    /// Create a reducer with the default skip-and-continue policy
    pub fn new() -> Self {
        Self::with_policy(MalformedPolicy::default())
    }

    /// Create a reducer with an explicit malformed-path policy
    pub fn with_policy(policy: MalformedPolicy) -> Self {
        Self {
            set: PathSet::new(),
            policy,
            stats: ReduceStats::default(),
            started: Instant::now(),
        }
    }

    /// Offer one candidate path
    pub fn offer(&mut self, path: &str) -> Result<(), PruneError> {
        self.stats.lines += 1;
        match self.set.insert(path) {
            Ok(Insertion::Inserted { replaced }) => {
                self.stats.replaced += replaced as u64;
            }
            Ok(Insertion::Covered) => {}
            Err(err @ PruneError::MalformedPath { .. }) => match self.policy {
                MalformedPolicy::Skip => {
                    self.stats.malformed += 1;
                    tracing::warn!(line = self.stats.lines, %err, "skipping malformed path");
                }
                MalformedPolicy::Abort => return Err(err),
            },
            Err(err) => return Err(err),
        }
        if self.stats.lines % PROGRESS_EVERY == 0 {
            tracing::info!(
                lines = self.stats.lines,
                unique = self.set.len(),
                elapsed_secs = self.started.elapsed().as_secs(),
                "reduction progress"
            );
        }
        Ok(())
    }

    /// Consume a one-path-per-line source. Blank lines are ignored.
    pub fn consume_lines<R: BufRead>(&mut self, reader: R) -> Result<(), PruneError> {
        for line in reader.lines() {
            let line = line?;
            let path = line.trim_end_matches(['\r', '\n']);
            if path.is_empty() {
                continue;
            }
            self.offer(path)?;
        }
        Ok(())
    }

    /// Current number of members
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// True while no member has been admitted
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Finish the run: the sorted minimal covering set plus run counters
    pub fn finish(self) -> (Vec<String>, ReduceStats) {
        (self.set.sorted_paths(), self.stats)
    }
}
