//! A gem's release history as supplied by the version-metadata fetcher.

use chrono::NaiveDate;
use gemfresh_version::Version;

/// When a release reached the registry. Kept as a closed variant so the
/// analyzer can tell "the registry had no date" from "the date would not
/// parse" without holding on to raw metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDate {
    Known(NaiveDate),
    Missing,
    Invalid,
}

impl ReleaseDate {
    pub fn known(self) -> Option<NaiveDate> {
        match self {
            ReleaseDate::Known(date) => Some(date),
            ReleaseDate::Missing | ReleaseDate::Invalid => None,
        }
    }
}

/// One published version of a gem.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub number: Version,
    pub created_at: ReleaseDate,
    pub prerelease: bool,
}

/// The release history the analyzer works against.
///
/// Both lists are newest-first and prerelease-free; `available` additionally
/// honors the as-of bound when one is in effect, while `known` does not.
/// The unfiltered view exists only so the analyzer can distinguish an
/// installed version that is missing from the registry from one that simply
/// had not been released yet as of the reference date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionHistory {
    pub available: Vec<Release>,
    pub known: Vec<Release>,
}

impl VersionHistory {
    /// Apply the history contract to raw registry rows: drop prereleases,
    /// order newest-first by version number, and restrict `available` to
    /// releases dated on or before `as_of`. Entries without a usable date are
    /// excluded from the bounded view, since they cannot be placed in time.
    pub fn build(mut releases: Vec<Release>, as_of: Option<NaiveDate>) -> Self {
        releases.retain(|release| !release.prerelease);
        releases.sort_by(|a, b| b.number.cmp(&a.number));

        let available = match as_of {
            None => releases.clone(),
            Some(bound) => releases
                .iter()
                .filter(|release| release.created_at.known().is_some_and(|date| date <= bound))
                .cloned()
                .collect(),
        };

        VersionHistory {
            available,
            known: releases,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.available.is_empty() && self.known.is_empty()
    }

    /// The newest release within the as-of bound.
    pub fn latest(&self) -> Option<&Release> {
        self.available.first()
    }

    /// Zero-based position of `version` in the bounded history: the number of
    /// strictly newer releases, 0 meaning "already the newest".
    pub fn distance_of(&self, version: &Version) -> Option<usize> {
        self.available
            .iter()
            .position(|release| release.number == *version)
    }

    /// Look a version up in the unbounded history.
    pub fn find_known(&self, version: &Version) -> Option<&Release> {
        self.known.iter().find(|release| release.number == *version)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn release(number: &str, date: Option<&str>, prerelease: bool) -> Release {
        Release {
            number: number.parse().unwrap(),
            created_at: match date {
                Some(date) => ReleaseDate::Known(date.parse().unwrap()),
                None => ReleaseDate::Missing,
            },
            prerelease,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_build_sorts_newest_first_and_drops_prereleases() {
        let history = VersionHistory::build(
            vec![
                release("7.0.0", Some("2024-01-01"), false),
                release("8.0.0.rc1", Some("2024-11-01"), true),
                release("8.0.0", Some("2025-01-01"), false),
            ],
            None,
        );

        let numbers: Vec<&str> = history
            .known
            .iter()
            .map(|release| release.number.as_str())
            .collect();
        assert_eq!(numbers, vec!["8.0.0", "7.0.0"]);
        assert_eq!(history.available, history.known);
    }

    #[test]
    fn test_build_bounds_available_by_as_of() {
        let history = VersionHistory::build(
            vec![
                release("8.0.0", Some("2025-01-01"), false),
                release("7.0.0", Some("2024-01-01"), false),
                release("6.0.0", None, false),
            ],
            Some(date("2024-06-01")),
        );

        // 8.0.0 is after the bound; 6.0.0 has no date to place it in time.
        assert_eq!(history.available.len(), 1);
        assert_eq!(history.available[0].number.as_str(), "7.0.0");
        assert_eq!(history.known.len(), 3);
    }

    #[test]
    fn test_distance_is_the_index_from_the_front() {
        let history = VersionHistory::build(
            vec![
                release("3.0.0", Some("2025-01-01"), false),
                release("2.0.0", Some("2024-01-01"), false),
                release("1.0.0", Some("2023-01-01"), false),
            ],
            None,
        );

        for (index, release) in history.available.iter().enumerate() {
            assert_eq!(history.distance_of(&release.number), Some(index));
        }
        assert_eq!(history.distance_of(&"9.9.9".parse().unwrap()), None);
    }
}
