//! Compact table of the gems with a newer release available.
//!
//! Up-to-date gems are omitted; the point of this format is a worklist.
//! Gems that could not be scored at all still appear, with their status in
//! place of numbers, so the table never silently hides a dependency.

use std::io::{self, Write};

use gemfresh_analyzer::{Freshness, Report};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::{Reporter, display_or_unknown};

pub struct TableReporter;

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Gem")]
    name: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Behind")]
    behind: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl Row {
    fn from_result(result: &Freshness) -> Self {
        Row {
            name: result.name.clone(),
            current: display_or_unknown(result.current_version.as_ref()),
            latest: display_or_unknown(result.latest_version.as_ref()),
            behind: display_or_unknown(result.version_distance.as_ref()),
            days: display_or_unknown(result.libyear_in_days.as_ref()),
            status: result.status.label().to_string(),
        }
    }
}

impl Reporter for TableReporter {
    fn generate(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        let rows: Vec<Row> = report
            .results
            .values()
            .filter(|result| result.version_distance != Some(0))
            .map(Row::from_result)
            .collect();

        if rows.is_empty() {
            return writeln!(out, "All direct dependencies are on their latest release.");
        }

        let mut table = Table::new(rows);
        table.with(Style::sharp());
        writeln!(out, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::fixtures;

    #[test]
    fn test_up_to_date_gems_are_omitted() {
        let report = fixtures::report(vec![
            fixtures::scored("rails", "7.0.0", "8.0.0", 1, 366),
            fixtures::scored("rake", "13.3.0", "13.3.0", 0, 0),
        ]);
        let mut out = Vec::new();
        TableReporter.generate(&report, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("rails"));
        assert!(!text.contains("rake"));
    }

    #[test]
    fn test_unscored_gems_still_get_a_row() {
        let report = fixtures::report(vec![fixtures::unresolvable("sidekiq", "6.0.0")]);
        let mut out = Vec::new();
        TableReporter.generate(&report, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("sidekiq"));
        assert!(text.contains("unresolvable_source"));
        assert!(text.contains("Unknown"));
    }

    #[test]
    fn test_everything_fresh_prints_a_note_instead() {
        let report = fixtures::report(vec![fixtures::scored("rake", "13.3.0", "13.3.0", 0, 0)]);
        let mut out = Vec::new();
        TableReporter.generate(&report, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "All direct dependencies are on their latest release.\n"
        );
    }
}
