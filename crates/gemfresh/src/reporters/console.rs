//! Verbose per-gem output, one block per direct dependency.

use std::io::{self, Write};

use gemfresh_analyzer::{Freshness, Report};

use super::{Reporter, display_or_unknown};

pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn generate(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        for result in report.results.values() {
            write_block(result, out)?;
        }
        Ok(())
    }
}

fn write_block(result: &Freshness, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}:", result.name)?;
    writeln!(
        out,
        "  Current version:  {}",
        display_or_unknown(result.current_version.as_ref())
    )?;
    writeln!(
        out,
        "  Released on:      {}",
        display_or_unknown(result.current_version_release_date.as_ref())
    )?;
    writeln!(
        out,
        "  Latest version:   {}",
        display_or_unknown(result.latest_version.as_ref())
    )?;
    writeln!(
        out,
        "  Released on:      {}",
        display_or_unknown(result.latest_version_release_date.as_ref())
    )?;
    writeln!(
        out,
        "  Releases behind:  {}",
        display_or_unknown(result.version_distance.as_ref())
    )?;
    writeln!(
        out,
        "  Libyear (days):   {}",
        display_or_unknown(result.libyear_in_days.as_ref())
    )?;
    writeln!(out, "  Status:           {}", result.status.label())?;
    if let Some(reason) = result.status.reason() {
        writeln!(out, "  Note:             {reason}")?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reporters::fixtures;

    #[test]
    fn test_scored_gem_prints_every_field() {
        let report = fixtures::report(vec![fixtures::scored("rails", "7.0.0", "8.0.0", 1, 366)]);
        let mut out = Vec::new();
        ConsoleReporter.generate(&report, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "rails:\n\
             \x20 Current version:  7.0.0\n\
             \x20 Released on:      2024-01-01\n\
             \x20 Latest version:   8.0.0\n\
             \x20 Released on:      2025-01-01\n\
             \x20 Releases behind:  1\n\
             \x20 Libyear (days):   366\n\
             \x20 Status:           ok\n\n"
        );
    }

    #[test]
    fn test_unscored_gem_prints_unknowns_and_the_reason() {
        let report = fixtures::report(vec![fixtures::unresolvable("rails", "7.0.0")]);
        let mut out = Vec::new();
        ConsoleReporter.generate(&report, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Latest version:   Unknown"));
        assert!(text.contains("Status:           unresolvable_source"));
        assert!(text.contains("Note:             rails is git-sourced"));
    }
}
