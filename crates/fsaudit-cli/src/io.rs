//! Stdio-or-file plumbing for the subcommands
//!
//! Open and create failures are fatal and name the offending path.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Where a subcommand reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Standard input
    Stdin,
    /// A named file
    File(PathBuf),
}

impl Source {
    /// Interpret an optional path argument; absent or `-` means stdin
    pub fn from_arg(arg: Option<PathBuf>) -> Self {
        match arg {
            None => Source::Stdin,
            Some(p) if p.as_os_str() == "-" => Source::Stdin,
            Some(p) => Source::File(p),
        }
    }

    /// Open the source for buffered reading
    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        match self {
            Source::Stdin => Ok(Box::new(BufReader::new(io::stdin()))),
            Source::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open input file {}", path.display()))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Where a subcommand writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dest {
    /// Standard output
    Stdout,
    /// A named file, truncated on create
    File(PathBuf),
}

impl Dest {
    /// Interpret an optional path argument; absent or `-` means stdout
    pub fn from_arg(arg: Option<PathBuf>) -> Self {
        match arg {
            None => Dest::Stdout,
            Some(p) if p.as_os_str() == "-" => Dest::Stdout,
            Some(p) => Dest::File(p),
        }
    }

    /// Create the destination for buffered writing
    pub fn create(&self) -> Result<Box<dyn Write>> {
        match self {
            Dest::Stdout => Ok(Box::new(BufWriter::new(io::stdout()))),
            Dest::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("cannot create output file {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}
