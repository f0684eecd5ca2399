//! Terminal output for project, mesh, and toolpath commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use printvault_service::ScanReport;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Table
    }
}

/// Print a list of rows as a table or a JSON array.
///
/// `empty` is shown instead of a headers-only table when there are no
/// rows ("No meshes on this project." and the like).
pub fn print_list<T: Serialize + Tabled>(rows: &[T], empty: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("{empty}");
            } else {
                println!("{}", Table::new(rows).with(Style::psql()));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(rows).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }
}

/// Print a single inspection report as aligned `field  value` lines.
pub fn print_report<T: Serialize + Tabled>(report: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let headers = T::headers();
            let width = headers.iter().map(|h| h.len()).max().unwrap_or(0);
            for (header, value) in headers.iter().zip(report.fields()) {
                println!("{header:width$}  {value}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a folder scan outcome: import/skip counts plus any
/// association warnings.
pub fn print_scan_report(report: &ScanReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_success(&format!(
                "Imported {} file(s), skipped {}",
                report.imported.len(),
                report.skipped.len()
            ));
            for warning in &report.warnings {
                print_warning(warning);
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}
