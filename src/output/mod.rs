//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan reports.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv};
pub use json_format::print_json;
pub use plain::{
    print_error, print_info, print_plain, print_scan_header, print_success, print_warning,
    write_plain,
};

use crate::cli::OutputFormat;
use crate::export::ReportDocument;
use std::io;

/// Format and print a report according to the specified format.
pub fn format_report(document: &ReportDocument, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(document),
        OutputFormat::Json => json_format::print_json(document),
        OutputFormat::Csv => csv_format::print_csv(document),
    }
}
