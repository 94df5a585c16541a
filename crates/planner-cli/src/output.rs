//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print records in the selected format.
///
/// Tables show the condensed `row` view; JSON prints the full records.
pub fn print_records<R, T, F>(records: &[R], row: F, format: OutputFormat)
where
    R: Serialize,
    T: Tabled,
    F: Fn(&R) -> T,
{
    match format {
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No results found.");
            } else {
                let rows: Vec<T> = records.iter().map(row).collect();
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single record in the selected format
pub fn print_record<R, T, F>(record: &R, row: F, format: OutputFormat)
where
    R: Serialize,
    T: Tabled,
    F: Fn(&R) -> T,
{
    match format {
        OutputFormat::Table => println!("{}", Table::new([row(record)])),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}

/// Render an optional value for a table cell.
pub fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opt_cell() {
        assert_eq!(opt(&Some(3)), "3");
        assert_eq!(opt::<String>(&None), "-");
    }
}
