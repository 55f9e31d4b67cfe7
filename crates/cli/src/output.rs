//! Output formatting for CLI

use clap::ValueEnum;
use serde::Serialize;

use crate::error::CliError;

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one record per line
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Render a table of label/value rows with aligned values
pub fn format_rows(rows: &[(&str, String)]) -> String {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("{label:<width$}  {value}\n"))
        .collect()
}
