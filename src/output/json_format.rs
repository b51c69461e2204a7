//! JSON output formatting.

use crate::export::ReportDocument;
use std::io;

/// Print a report in JSON format, the same layout as an exported file.
pub fn print_json(document: &ReportDocument) -> io::Result<()> {
    let json = document
        .to_pretty_string()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);
    Ok(())
}
