//! Per-gem analysis output, consumed by reporters.

use chrono::NaiveDate;
use serde::Serialize;

/// How a gem's evaluation terminated. Every gem resolves to exactly one of
/// these; the non-`Ok` variants carry the human-readable reason the numeric
/// fields are absent. Failures are data, never errors: one unscoreable gem
/// must not abort analysis of the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FreshnessStatus {
    /// Full computation succeeded.
    Ok,
    /// The gem's source cannot be compared against a remote registry
    /// (git, path, plugin, or no resolvable source at all).
    UnresolvableSource { reason: String },
    /// The registry returned no version history.
    MetadataUnavailable { reason: String },
    /// An as-of bound is in effect and no release existed on or before it.
    LatestVersionUnavailableForDate { reason: String },
    /// The installed version is absent from the known history (incomplete
    /// metadata, or the version was yanked).
    CurrentVersionMissing { reason: String },
    /// Metadata present but a needed release date is absent.
    ReleaseDateMissing { reason: String },
    /// Metadata present but a needed release date would not parse.
    InvalidReleaseDate { reason: String },
    /// The installed version's own release date is after the as-of bound.
    /// Signals an inconsistency between lockfile and registry.
    CurrentVersionUnreleasedForDate { reason: String },
}

impl FreshnessStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FreshnessStatus::Ok)
    }

    /// Stable machine-readable name, used in CSV output and logs.
    pub fn label(&self) -> &'static str {
        match self {
            FreshnessStatus::Ok => "ok",
            FreshnessStatus::UnresolvableSource { .. } => "unresolvable_source",
            FreshnessStatus::MetadataUnavailable { .. } => "metadata_unavailable",
            FreshnessStatus::LatestVersionUnavailableForDate { .. } => {
                "latest_version_unavailable_for_date"
            }
            FreshnessStatus::CurrentVersionMissing { .. } => "current_version_missing",
            FreshnessStatus::ReleaseDateMissing { .. } => "release_date_missing",
            FreshnessStatus::InvalidReleaseDate { .. } => "invalid_release_date",
            FreshnessStatus::CurrentVersionUnreleasedForDate { .. } => {
                "current_version_unreleased_for_date"
            }
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            FreshnessStatus::Ok => None,
            FreshnessStatus::UnresolvableSource { reason }
            | FreshnessStatus::MetadataUnavailable { reason }
            | FreshnessStatus::LatestVersionUnavailableForDate { reason }
            | FreshnessStatus::CurrentVersionMissing { reason }
            | FreshnessStatus::ReleaseDateMissing { reason }
            | FreshnessStatus::InvalidReleaseDate { reason }
            | FreshnessStatus::CurrentVersionUnreleasedForDate { reason } => Some(reason),
        }
    }
}

/// The analysis record for one direct dependency. Built once per run, never
/// mutated. Only an `Ok` status carries the numeric fields; every other
/// status leaves them `None` but the record is still emitted so reports
/// account for the whole direct-dependency set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Freshness {
    pub name: String,
    pub current_version: Option<String>,
    pub current_version_release_date: Option<NaiveDate>,
    pub latest_version: Option<String>,
    pub latest_version_release_date: Option<NaiveDate>,
    /// Count of releases strictly newer than the installed one;
    /// 0 means already on the latest.
    pub version_distance: Option<usize>,
    /// Whole days between the latest and installed release dates,
    /// clamped at zero.
    pub libyear_in_days: Option<i64>,
    pub is_direct: bool,
    pub status: FreshnessStatus,
}

impl Freshness {
    /// A record for a gem that could not be scored.
    pub(crate) fn skipped(
        name: &str,
        current_version: Option<String>,
        status: FreshnessStatus,
    ) -> Self {
        Freshness {
            name: name.to_string(),
            current_version,
            current_version_release_date: None,
            latest_version: None,
            latest_version_release_date: None,
            version_distance: None,
            libyear_in_days: None,
            is_direct: true,
            status,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}
