//! Output formats for a finished report.

use std::io::{self, Write};

use gemfresh_analyzer::Report;

mod console;
mod csv;
mod json;
mod table;

pub use console::ConsoleReporter;
pub use csv::CsvReporter;
pub use json::JsonReporter;
pub use table::TableReporter;

pub trait Reporter {
    fn generate(&self, report: &Report, out: &mut dyn Write) -> io::Result<()>;
}

fn display_or_unknown<T: std::fmt::Display>(value: Option<&T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "Unknown".to_string(),
    }
}
