#![warn(missing_docs)]

//! fsaudit command-line interface
//!
//! Three subcommands over an inventory report: `classify` (full bucket
//! analysis), `filter-dirs` (extract immutable directories), and `prune`
//! (reduce a path list to its minimal covering set).

pub mod cli;
pub mod io;

pub use cli::{Cli, Command};
