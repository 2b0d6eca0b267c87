//! Parses Gemfile.lock files into a plain data model for freshness analysis.
//!
//! The parser is total: any string input yields a [`Lockfile`], with
//! unrecognized lines skipped and missing sections left empty.

pub mod datatypes;
pub mod parser;
#[cfg(test)]
mod tests;

pub use datatypes::{Dependency, Lockfile, RubyVersion, Source, SourceKind, Spec};
pub use parser::parse;
