//! Machine-readable CSV, one row per direct dependency.

use std::io::{self, Write};

use gemfresh_analyzer::Report;

use super::Reporter;

const HEADER: &str =
    "gem,current_version,current_release_date,latest_version,latest_release_date,releases_behind,libyear_days,status";

pub struct CsvReporter;

impl Reporter for CsvReporter {
    fn generate(&self, report: &Report, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{HEADER}")?;
        for result in report.results.values() {
            let fields = [
                quote(&result.name),
                optional(result.current_version.as_deref()),
                optional_display(result.current_version_release_date.as_ref()),
                optional(result.latest_version.as_deref()),
                optional_display(result.latest_version_release_date.as_ref()),
                optional_display(result.version_distance.as_ref()),
                optional_display(result.libyear_in_days.as_ref()),
                result.status.label().to_string(),
            ];
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(())
    }
}

fn optional(value: Option<&str>) -> String {
    value.map(quote).unwrap_or_default()
}

fn optional_display<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map(|value| quote(&value.to_string())).unwrap_or_default()
}

/// RFC 4180 quoting, applied only when the field needs it.
fn quote(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
