//! Inventory record model and bounded field splitting
//!
//! Report format, one record per line:
//!
//! ```text
//! inode  ?  ?  UID  GID  PERMS       FLAGS  SEP  PATH
//! 1579008 733120217 0 34076 1363 -rw-r--r-- FAu -- /srv/data/fcr-0023052.fits
//! ```
//!
//! The path is everything after the 8th field and may contain embedded
//! whitespace, so splitting is bounded: exactly 8 delimited fields, then the
//! remainder.

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// File type derived from the record's flag string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    /// Regular file (`F`)
    File,
    /// Directory (`D`)
    Directory,
    /// Symbolic link (`L`)
    Symlink,
    /// Reserved `O` flag; treated as a fatal classification error
    Other,
}

/// One parsed line of the inventory report, borrowing from the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryRecord<'a> {
    /// Inode number as read; opaque to classification
    pub inode: &'a str,
    /// Reserved field
    pub na1: &'a str,
    /// Reserved field
    pub na2: &'a str,
    /// Owning uid, compared as an opaque token
    pub uid: &'a str,
    /// Owning gid, compared as an opaque token
    pub gid: &'a str,
    /// Fixed-format permission string, e.g. `-r-xr-xr-x`
    pub perms: &'a str,
    /// Single-character flag alphabet (`F` `D` `L` `O` type, `X` locked)
    pub flags: &'a str,
    /// Absolute path; the remainder of the line, embedded whitespace intact
    pub path: &'a str,
}

impl<'a> InventoryRecord<'a> {
    /// Parse one report line. `line_no` is 1-based and only used for error
    /// reporting. The literal `--` separator field is consumed and dropped.
    pub fn parse(line: &'a str, line_no: u64) -> Result<Self, ScanError> {
        let mut fields = [""; 8];
        let mut rest = line;
        let mut seen = 0usize;
        for slot in fields.iter_mut() {
            rest = rest.trim_start();
            if rest.is_empty() {
                return Err(ScanError::MalformedRecord {
                    line: line_no,
                    fields: seen,
                });
            }
            match rest.find(char::is_whitespace) {
                Some(end) => {
                    *slot = &rest[..end];
                    rest = &rest[end..];
                }
                None => {
                    // Token runs to end of line: no 9th field follows.
                    return Err(ScanError::MalformedRecord {
                        line: line_no,
                        fields: seen + 1,
                    });
                }
            }
            seen += 1;
        }
        let path = rest.trim_start().trim_end_matches(['\r', '\n']);
        if path.is_empty() {
            return Err(ScanError::MalformedRecord {
                line: line_no,
                fields: seen,
            });
        }
        Ok(Self {
            inode: fields[0],
            na1: fields[1],
            na2: fields[2],
            uid: fields[3],
            gid: fields[4],
            perms: fields[5],
            flags: fields[6],
            path,
        })
    }

    /// File type from the flag alphabet, first match in `F` `D` `L` `O`
    /// order. `None` when no type flag is present; such records still take
    /// part in lock and ownership classification.
    pub fn kind(&self) -> Option<FileKind> {
        if self.flags.contains('F') {
            Some(FileKind::File)
        } else if self.flags.contains('D') {
            Some(FileKind::Directory)
        } else if self.flags.contains('L') {
            Some(FileKind::Symlink)
        } else if self.flags.contains('O') {
            Some(FileKind::Other)
        } else {
            None
        }
    }

    /// Is the immutable/locked flag (`X`) set?
    pub fn is_locked(&self) -> bool {
        self.flags.contains('X')
    }
}
