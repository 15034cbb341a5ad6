//! Error types for the fsaudit-prune subsystem

/// All errors that can occur during path reduction
#[derive(Debug, thiserror::Error)]
pub enum PruneError {
    /// Candidate path is not usable: empty, relative, or contains a NUL byte
    #[error("malformed path {path:?}: {reason}")]
    MalformedPath {
        /// The offending candidate path as read
        path: String,
        /// What made it unusable
        reason: &'static str,
    },
    /// I/O error while reading the candidate stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PruneError {
    pub(crate) fn malformed(path: &str, reason: &'static str) -> Self {
        PruneError::MalformedPath {
            path: path.to_string(),
            reason,
        }
    }
}
