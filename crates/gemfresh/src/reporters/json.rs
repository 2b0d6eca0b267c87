//! The whole report as one JSON document, results keyed by gem name.

use std::io::{self, Write};

use gemfresh_analyzer::Report;

use super::Reporter;

pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn generate(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::reporters::fixtures;

    #[test]
    fn test_emits_results_and_risk_summary() {
        let report = fixtures::report(vec![
            fixtures::scored("rails", "7.0.0", "8.0.0", 1, 366),
            fixtures::unresolvable("sidekiq", "6.0.0"),
        ]);
        let mut out = Vec::new();
        JsonReporter.generate(&report, &mut out).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["results"]["rails"]["current_version"], "7.0.0");
        assert_eq!(json["results"]["rails"]["latest_version_release_date"], "2025-01-01");
        assert_eq!(json["results"]["rails"]["version_distance"], 1);
        assert_eq!(json["results"]["rails"]["status"]["kind"], "ok");
        assert_eq!(
            json["results"]["sidekiq"]["status"]["kind"],
            "unresolvable_source"
        );
        assert_eq!(json["results"]["sidekiq"]["libyear_in_days"], serde_json::Value::Null);
        // Only the scored gem carries risk weight.
        assert_eq!(json["risk"]["rated"], 1);
        assert_eq!(json["risk"]["stars"], 5);
    }
}
