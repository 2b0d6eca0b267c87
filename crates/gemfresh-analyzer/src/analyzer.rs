//! The per-gem freshness state machine.
//!
//! Every direct dependency resolves to exactly one terminal
//! [`FreshnessStatus`], and every one of them is emitted, so a report always
//! accounts for the whole direct-dependency set no matter how much of the
//! metadata was usable.

use std::collections::HashMap;

use chrono::NaiveDate;
use gemfresh_lockfile::{Lockfile, SourceKind};
use gemfresh_version::Version;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use crate::freshness::{Freshness, FreshnessStatus};
use crate::history::{ReleaseDate, VersionHistory};
use crate::risk::RiskSummary;

/// Everything one analysis run produces: one record per direct dependency,
/// in declaration order, plus the aggregate risk summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub results: IndexMap<String, Freshness>,
    pub risk: RiskSummary,
}

/// Score each direct dependency of `lockfile` against its version history.
///
/// `histories` must satisfy the fetcher contract: newest-first,
/// prerelease-free, and bounded by `as_of` in the `available` view. The
/// analyzer trusts that ordering and filtering; it never re-validates.
pub fn analyze(
    lockfile: &Lockfile<'_>,
    direct_dependency_names: &[&str],
    histories: &HashMap<String, VersionHistory>,
    as_of: Option<NaiveDate>,
) -> Report {
    let mut results = IndexMap::with_capacity(direct_dependency_names.len());

    for &name in direct_dependency_names {
        let result = evaluate(lockfile, name, histories, as_of);
        if let Some(reason) = result.status.reason() {
            warn!(gem = name, status = result.status.label(), "{reason}");
        }
        results.insert(name.to_string(), result);
    }

    let risk = RiskSummary::from_results(results.values());
    Report { results, risk }
}

fn evaluate(
    lockfile: &Lockfile<'_>,
    name: &str,
    histories: &HashMap<String, VersionHistory>,
    as_of: Option<NaiveDate>,
) -> Freshness {
    let Some((source, spec)) = lockfile.find_spec(name) else {
        return Freshness::skipped(
            name,
            None,
            FreshnessStatus::UnresolvableSource {
                reason: format!("{name} is not resolved by any lockfile source"),
            },
        );
    };

    let current_version = spec.version.to_string();

    if source.kind != SourceKind::Rubygems {
        let reason = match source.kind {
            SourceKind::Git => format!("{name} is git-sourced and has no registry to compare"),
            SourceKind::Path => format!("{name} is path-sourced and has no registry to compare"),
            _ => format!("{name} comes from an unsupported source"),
        };
        return Freshness::skipped(
            name,
            Some(current_version),
            FreshnessStatus::UnresolvableSource { reason },
        );
    }

    if source.remote.is_none() {
        return Freshness::skipped(
            name,
            Some(current_version),
            FreshnessStatus::MetadataUnavailable {
                reason: format!("{name} has no remote URI to fetch versions from"),
            },
        );
    }

    let history = match histories.get(name) {
        Some(history) if !history.is_empty() => history,
        _ => {
            return Freshness::skipped(
                name,
                Some(current_version),
                FreshnessStatus::MetadataUnavailable {
                    reason: format!("no version metadata returned for {name}"),
                },
            );
        }
    };

    // The bounded view can only be empty when an as-of date cut it down.
    let Some(latest) = history.latest() else {
        let bound = as_of.map_or_else(|| "the as-of date".to_string(), |date| date.to_string());
        return Freshness::skipped(
            name,
            Some(current_version),
            FreshnessStatus::LatestVersionUnavailableForDate {
                reason: format!("no release of {name} was available on or before {bound}"),
            },
        );
    };

    let current_number = match Version::new(&current_version) {
        Ok(version) => version,
        Err(_) => {
            return Freshness::skipped(
                name,
                Some(current_version.clone()),
                FreshnessStatus::CurrentVersionMissing {
                    reason: format!(
                        "installed version {current_version} of {name} is not a valid gem version"
                    ),
                },
            );
        }
    };

    let Some(distance) = history.distance_of(&current_number) else {
        return missing_from_window(name, &current_version, &current_number, history, as_of);
    };

    let latest_date = match checked_date(latest.created_at) {
        Ok(date) => date,
        Err(status) => return Freshness::skipped(name, Some(current_version), status(name)),
    };
    let current_date = match checked_date(history.available[distance].created_at) {
        Ok(date) => date,
        Err(status) => return Freshness::skipped(name, Some(current_version), status(name)),
    };

    // Clamp at zero: registries occasionally re-date releases, and a
    // negative age is worse than no age.
    let libyear_in_days = (latest_date - current_date).num_days().max(0);

    Freshness {
        name: name.to_string(),
        current_version: Some(current_version),
        current_version_release_date: Some(current_date),
        latest_version: Some(latest.number.as_str().to_string()),
        latest_version_release_date: Some(latest_date),
        version_distance: Some(distance),
        libyear_in_days: Some(libyear_in_days),
        is_direct: true,
        status: FreshnessStatus::Ok,
    }
}

/// The installed version is not in the as-of-bounded history. Consult the
/// unbounded view to say why as precisely as possible.
fn missing_from_window(
    name: &str,
    current_version: &str,
    current_number: &Version,
    history: &VersionHistory,
    as_of: Option<NaiveDate>,
) -> Freshness {
    let current = Some(current_version.to_string());

    let Some(release) = history.find_known(current_number) else {
        return Freshness::skipped(
            name,
            current,
            FreshnessStatus::CurrentVersionMissing {
                reason: format!(
                    "installed version {current_version} of {name} is missing from registry metadata"
                ),
            },
        );
    };

    match release.created_at {
        ReleaseDate::Missing => Freshness::skipped(
            name,
            current,
            FreshnessStatus::ReleaseDateMissing {
                reason: format!("no release date recorded for {name} {current_version}"),
            },
        ),
        ReleaseDate::Invalid => Freshness::skipped(
            name,
            current,
            FreshnessStatus::InvalidReleaseDate {
                reason: format!("unparseable release date for {name} {current_version}"),
            },
        ),
        ReleaseDate::Known(date) if as_of.is_some_and(|bound| date > bound) => Freshness::skipped(
            name,
            current,
            FreshnessStatus::CurrentVersionUnreleasedForDate {
                reason: format!(
                    "installed version {current_version} of {name} was released after the as-of date"
                ),
            },
        ),
        // Dated in range yet absent from the bounded view: inconsistent
        // metadata, treated the same as a missing version.
        ReleaseDate::Known(_) => Freshness::skipped(
            name,
            current,
            FreshnessStatus::CurrentVersionMissing {
                reason: format!(
                    "installed version {current_version} of {name} is missing from registry metadata"
                ),
            },
        ),
    }
}

type StatusFor = fn(&str) -> FreshnessStatus;

fn checked_date(date: ReleaseDate) -> Result<NaiveDate, StatusFor> {
    match date {
        ReleaseDate::Known(date) => Ok(date),
        ReleaseDate::Missing => Err(|name| FreshnessStatus::ReleaseDateMissing {
            reason: format!("release date data for {name} is incomplete"),
        }),
        ReleaseDate::Invalid => Err(|name| FreshnessStatus::InvalidReleaseDate {
            reason: format!("release date data for {name} is unparseable"),
        }),
    }
}
