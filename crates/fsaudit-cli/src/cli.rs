//! Subcommand definitions and dispatch

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use fsaudit_prune::{MalformedPolicy, Reducer};
use fsaudit_scan::{filter_immutable_dirs, Classifier, ClassifyPolicy, FileBucketSink};

use crate::io::{Dest, Source};

/// Filesystem-governance audits over policy-run inventory reports
#[derive(Parser)]
#[command(name = "fsaudit")]
#[command(about = "Filesystem-governance audits over policy-run inventory reports", long_about = None)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// The audit operations
#[derive(Subcommand)]
pub enum Command {
    /// Classify every record into bucket files under the output directory
    Classify {
        /// Inventory report; stdin when absent or `-`
        infile: Option<PathBuf>,
        /// Track inodes not matching this uid
        #[arg(short, long, default_value = "34076")]
        uid: String,
        /// Track inodes not matching this gid
        #[arg(short, long, default_value = "1363")]
        gid: String,
        /// Track files not matching these permissions
        #[arg(short, long, default_value = "-r--r--r--")]
        file_perms: String,
        /// Track dirs not matching these permissions
        #[arg(short, long, default_value = "-r-xr-xr-x")]
        dir_perms: String,
        /// Directory for bucket files; created if necessary
        #[arg(short = 't', long, default_value = "/tmp/fsaudit")]
        outdir: PathBuf,
    },
    /// Extract the paths of directories marked immutable
    FilterDirs {
        /// Inventory report; stdin when absent or `-`
        infile: Option<PathBuf>,
        /// Path list destination; stdout when absent or `-`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reduce a path list to its minimal covering set
    Prune {
        /// Candidate paths, one per line; stdin when absent or `-`
        infile: Option<PathBuf>,
        /// Reduced list destination; stdout when absent or `-`
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Abort on the first malformed path instead of skipping it
        #[arg(long)]
        strict: bool,
    },
}

impl Cli {
    /// Run the selected subcommand
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Classify {
                infile,
                uid,
                gid,
                file_perms,
                dir_perms,
                outdir,
            } => {
                let policy = ClassifyPolicy {
                    uid,
                    gid,
                    file_perms,
                    dir_perms,
                };
                classify(Source::from_arg(infile), policy, &outdir)
            }
            Command::FilterDirs { infile, output } => {
                filter_dirs(Source::from_arg(infile), Dest::from_arg(output))
            }
            Command::Prune {
                infile,
                output,
                strict,
            } => {
                let policy = if strict {
                    MalformedPolicy::Abort
                } else {
                    MalformedPolicy::Skip
                };
                prune(Source::from_arg(infile), Dest::from_arg(output), policy)
            }
        }
    }
}

fn classify(source: Source, policy: ClassifyPolicy, outdir: &std::path::Path) -> Result<()> {
    let reader = source.open()?;
    let mut sink = FileBucketSink::create(outdir)
        .with_context(|| format!("cannot create output directory {}", outdir.display()))?;
    let classifier = Classifier::new(policy);
    let stats = classifier.classify_lines(reader, &mut sink)?;
    sink.finish()
        .with_context(|| format!("cannot flush bucket files under {}", outdir.display()))?;
    tracing::info!(
        lines = stats.lines,
        outdir = %outdir.display(),
        "classification complete"
    );
    Ok(())
}

fn filter_dirs(source: Source, dest: Dest) -> Result<()> {
    let reader = source.open()?;
    let mut out = dest.create()?;
    let stats = filter_immutable_dirs(reader, &mut out)?;
    out.flush().context("cannot flush output")?;
    tracing::info!(
        lines = stats.lines,
        immutable_dirs = stats.selected,
        "immutable-dir filter complete"
    );
    Ok(())
}

fn prune(source: Source, dest: Dest, policy: MalformedPolicy) -> Result<()> {
    let reader = source.open()?;
    let mut reducer = Reducer::with_policy(policy);
    reducer.consume_lines(reader)?;
    let (paths, stats) = reducer.finish();
    let mut out = dest.create()?;
    for path in &paths {
        out.write_all(path.as_bytes())?;
        out.write_all(b"\n")?;
    }
    out.flush().context("cannot flush output")?;
    tracing::info!(
        lines = stats.lines,
        malformed = stats.malformed,
        unique_paths = paths.len(),
        "found {} unique paths",
        paths.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn prune_subcommand_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paths");
        let output = dir.path().join("reduced");
        let mut f = std::fs::File::create(&input).unwrap();
        write!(f, "/a/b\n/a\n/a/b/c\n/q\n").unwrap();
        drop(f);

        let cli = Cli {
            command: Command::Prune {
                infile: Some(input),
                output: Some(output.clone()),
                strict: false,
            },
        };
        cli.run().unwrap();

        let reduced = std::fs::read_to_string(&output).unwrap();
        assert_eq!(reduced, "/a\n/q\n");
    }

    #[test]
    fn strict_prune_fails_on_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("paths");
        std::fs::write(&input, "/ok\nnot-absolute\n").unwrap();

        let cli = Cli {
            command: Command::Prune {
                infile: Some(input),
                output: Some(dir.path().join("reduced")),
                strict: true,
            },
        };
        assert!(cli.run().is_err());
    }

    #[test]
    fn classify_subcommand_writes_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report");
        let outdir = dir.path().join("buckets");
        std::fs::write(
            &input,
            "1 0 0 34076 1363 -r--r--r-- F -- /srv/file\n\
             2 0 0 34076 1363 dr-xr-xr-x DX -- /srv/frozen\n",
        )
        .unwrap();

        let cli = Cli {
            command: Command::Classify {
                infile: Some(input),
                uid: "34076".into(),
                gid: "1363".into(),
                file_perms: "-r--r--r--".into(),
                dir_perms: "-r-xr-xr-x".into(),
                outdir: outdir.clone(),
            },
        };
        cli.run().unwrap();

        assert_eq!(
            std::fs::read_to_string(outdir.join("files")).unwrap(),
            "/srv/file\n"
        );
        assert_eq!(
            std::fs::read_to_string(outdir.join("locked")).unwrap(),
            "/srv/frozen\n"
        );
    }

    #[test]
    fn filter_dirs_subcommand_extracts_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("report");
        let output = dir.path().join("dirs");
        std::fs::write(
            &input,
            "1 0 0 1 1 -r--r--r-- F -- /srv/file\n\
             2 0 0 1 1 dr-xr-xr-x DX -- /srv/frozen\n",
        )
        .unwrap();

        let cli = Cli {
            command: Command::FilterDirs {
                infile: Some(input),
                output: Some(output.clone()),
            },
        };
        cli.run().unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "/srv/frozen\n");
    }
}
