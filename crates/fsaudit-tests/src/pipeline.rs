//! End-to-end pipeline: report → classifier → candidate list → reducer

use std::fmt::Write as _;

/// One synthetic inventory entry
#[derive(Debug, Clone)]
pub struct ReportSpec {
    /// Flag string, e.g. `DX`
    pub flags: &'static str,
    /// Permission string
    pub perms: &'static str,
    /// Absolute path
    pub path: &'static str,
}

/// Render report lines in the policy-run format (9 whitespace-delimited
/// fields, path last) for a uniform owner.
pub fn synthetic_report(uid: &str, gid: &str, entries: &[ReportSpec]) -> String {
    let mut out = String::new();
    for (i, e) in entries.iter().enumerate() {
        writeln!(
            out,
            "{} {} 0 {} {} {} {} -- {}",
            i + 1,
            i * 7 + 100,
            uid,
            gid,
            e.perms,
            e.flags,
            e.path
        )
        .expect("string write cannot fail");
    }
    out
}
