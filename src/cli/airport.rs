//! Airport lookup command

use std::path::Path;

use crate::airports::AirportDirectory;
use crate::cli::args::GlobalOptions;
use crate::config::Config;
use crate::error::Result;
use crate::models::AirportDisplay;
use crate::output::Formattable;

/// Search airports; `--csv` wins over the configured file
pub fn search(opts: &GlobalOptions, query: &str, csv: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default_at(opts.config_ref())?;
    let path = csv.or(config.preferences.airports_csv.as_deref());
    let directory = AirportDirectory::load(path)?;

    let display: Vec<AirportDisplay> = directory
        .search(query)
        .into_iter()
        .map(AirportDisplay::from)
        .collect();
    display.print(opts.format)
}
