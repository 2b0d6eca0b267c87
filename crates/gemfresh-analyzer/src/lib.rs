//! Freshness and risk analysis over a parsed lockfile.
//!
//! Given a [`gemfresh_lockfile::Lockfile`], the set of direct-dependency
//! names, and a pre-filtered version history per gem, [`analyze`] produces
//! one [`Freshness`] record per direct dependency plus an aggregate
//! [`RiskSummary`] and star rating. Pure and synchronous; all I/O lives in
//! the callers.

pub mod analyzer;
pub mod freshness;
pub mod history;
pub mod risk;

pub use analyzer::{Report, analyze};
pub use freshness::{Freshness, FreshnessStatus};
pub use history::{Release, ReleaseDate, VersionHistory};
pub use risk::{RiskSummary, RiskTier};
