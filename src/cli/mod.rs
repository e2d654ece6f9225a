//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

pub mod airport;
pub mod args;
pub mod auth;
pub mod cache;
pub mod context;
pub mod exclude;
pub mod export;
pub mod favorite;
pub mod init;
pub mod search;
pub mod status;

pub use args::{OutputFormat, RequestArgs, Toggle};
pub use context::CommandContext;

/// FlightWatcher - saved flight searches and favorites, synced with your account
#[derive(Parser, Debug)]
#[command(name = "flightwatcher")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "FLIGHTWATCHER_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "FLIGHTWATCHER_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "FLIGHTWATCHER_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the record cache and always read from the server
    #[arg(long, global = true, env = "FLIGHTWATCHER_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure the Supabase project and sign in
    Init,

    /// Sign in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(long, short = 'e')]
        email: Option<String>,
    },

    /// Sign out and drop cached records
    Logout,

    /// Show configuration, session and local data status
    Status,

    /// Display version information
    Version,

    /// Manage saved searches
    #[command(subcommand)]
    Search(SearchCommands),

    /// Manage favorite trips
    #[command(subcommand, visible_alias = "fav")]
    Favorite(FavoriteCommands),

    /// Manage excluded destinations per departure airport
    #[command(subcommand)]
    Exclude(ExcludeCommands),

    /// Look up airports
    #[command(subcommand)]
    Airport(AirportCommands),

    /// Manage the local record cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Write a JSON backup of all records
    Export {
        /// Directory to write into (defaults to the data directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Turn automatic backups after each change on or off instead
        #[arg(long, value_enum)]
        auto: Option<Toggle>,
    },

    /// Upload records saved while signed out to your account
    Migrate,

    /// Show or set developer mode
    DevMode {
        #[arg(value_enum)]
        state: Option<Toggle>,
    },

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   flightwatcher completion bash > /etc/bash_completion.d/flightwatcher
  zsh:    flightwatcher completion zsh > \"${fpath[1]}/_flightwatcher\"
  fish:   flightwatcher completion fish > ~/.config/fish/completions/flightwatcher.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Saved search subcommands
#[derive(Subcommand, Debug)]
pub enum SearchCommands {
    /// List saved searches
    #[command(visible_alias = "ls")]
    List,

    /// Show one saved search with its last results
    Show {
        /// Search ID
        id: String,
    },

    /// Save a new search
    #[command(after_help = "EXAMPLES:\n  \
            flightwatcher search save \"Spring\" --out 2025-03-01 --back 2025-03-04\n  \
            flightwatcher search save \"Mornings\" -f CRL --out 2025-03-01@06:00-12:00 --budget 60\n  \
            flightwatcher search save \"Watch\" --out 2025-04-10 --auto-check --interval 1800")]
    Save {
        /// Display name
        name: String,

        #[command(flatten)]
        request: RequestArgs,

        /// Check this search periodically for new results
        #[arg(long)]
        auto_check: bool,

        /// Seconds between automatic checks
        #[arg(long, requires = "auto_check")]
        interval: Option<u64>,
    },

    /// Delete a saved search
    #[command(visible_alias = "rm")]
    Delete {
        /// Search ID
        id: String,
    },

    /// Mark a search as used and print its request
    Use {
        /// Search ID
        id: String,
    },

    /// Turn automatic checks on or off
    AutoCheck {
        /// Search ID
        id: String,

        #[arg(value_enum)]
        state: Toggle,

        /// Seconds between checks
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Record the trips found by a check and keep the new ones
    RecordCheck {
        /// Search ID
        id: String,

        /// JSON file with the trips found (`-` for stdin)
        #[arg(long, short = 'r')]
        results: PathBuf,

        /// Mark the new results as test data
        #[arg(long)]
        test: bool,
    },

    /// List automatic checks that are due
    Due,

    /// Show or clear pending new results
    NewResults {
        /// Clear the new results of this search
        #[arg(long)]
        clear: Option<String>,
    },
}

/// Favorite subcommands
#[derive(Subcommand, Debug)]
pub enum FavoriteCommands {
    /// List favorites
    #[command(visible_alias = "ls")]
    List {
        /// Show archived favorites instead
        #[arg(long, conflicts_with = "all")]
        archived: bool,

        /// Show active and archived favorites
        #[arg(long)]
        all: bool,
    },

    /// Add a trip to favorites
    Add {
        /// JSON file with one trip (`-` for stdin)
        #[arg(long, short = 't')]
        trip: PathBuf,

        /// Saved search the trip was found with
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Delete a favorite
    #[command(visible_alias = "rm")]
    Delete {
        /// Favorite ID
        id: String,
    },

    /// Archive or unarchive a favorite
    Archive {
        /// Favorite ID
        id: String,
    },

    /// Record whether a favorite is still available
    Status {
        /// Favorite ID
        id: String,

        /// `on` when still available
        #[arg(value_enum)]
        available: Toggle,
    },

    /// Check whether a trip is already a favorite
    Check {
        /// JSON file with one trip (`-` for stdin)
        #[arg(long, short = 't')]
        trip: PathBuf,
    },
}

/// Excluded destination subcommands
#[derive(Subcommand, Debug)]
pub enum ExcludeCommands {
    /// Replace the excluded destinations of an airport
    Set {
        /// Departure airport
        airport: String,

        /// Destination codes, comma-separated (empty clears)
        #[arg(value_delimiter = ',')]
        codes: Vec<String>,
    },

    /// Show the excluded destinations of an airport
    Get {
        /// Departure airport
        airport: String,
    },

    /// Show excluded destinations of every airport
    List,
}

/// Airport subcommands
#[derive(Subcommand, Debug)]
pub enum AirportCommands {
    /// Search airports by code, name, city or country
    Search {
        /// Text to look for (empty lists everything)
        #[arg(default_value = "")]
        query: String,

        /// Airports CSV overriding the configured one
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

/// Cache management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cache statistics
    Status,
    /// Clear all cached records
    Clear,
    /// Print the local store path
    Path,
    /// Remove cached records older than the given age
    Sweep {
        /// Maximum age in hours
        #[arg(long, default_value_t = 24)]
        older_than_hours: u64,
    },
}
