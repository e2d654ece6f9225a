//! Output formatting for CLI results

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

pub mod formatters;
pub mod json;
pub mod table;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> Result<String>;

    /// Format and print to stdout
    fn print(&self, format: OutputFormat) -> Result<()> {
        println!("{}", self.format(format)?);
        Ok(())
    }
}

impl<T: Tabled + Serialize> Formattable for Vec<T> {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(self)?),
            OutputFormat::Table => Ok(table::format_table(self)),
            OutputFormat::Pretty => Ok(table::format_pretty(self)),
        }
    }
}

/// Print a JSON envelope in JSON mode, otherwise a plain message
pub fn print_result<T: Serialize + ?Sized>(data: &T, format: OutputFormat, message: &str) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", json::format_json(data)?),
        _ => println!("{}", message),
    }
    Ok(())
}
