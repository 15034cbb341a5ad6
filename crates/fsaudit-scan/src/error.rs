//! Error types for the fsaudit-scan subsystem

/// All errors that can occur while scanning an inventory report
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A line did not split into the expected 9 whitespace-delimited fields
    #[error("line {line} split into {fields} fields, expected 9")]
    MalformedRecord {
        /// 1-based line number in the report
        line: u64,
        /// How many fields the line actually produced
        fields: usize,
    },
    /// A record carries the reserved `O` (other) type flag
    #[error("line {line}: invalid file type in flags {flags:?}")]
    InvalidFileType {
        /// 1-based line number in the report
        line: u64,
        /// The record's flag string
        flags: String,
    },
    /// I/O error while reading the report or writing a bucket
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
