//! FlightWatcher CLI - saved flight searches and favorites, synced with Supabase

use clap::{CommandFactory, Parser};

mod airports;
mod cache;
mod cli;
mod client;
mod config;
mod error;
mod models;
mod output;
mod store;

use cli::args::GlobalOptions;
use cli::{
    AirportCommands, CacheCommands, Cli, Commands, ExcludeCommands, FavoriteCommands,
    SearchCommands,
};
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts).await,
        Commands::Login { email } => cli::auth::login(&opts, email).await,
        Commands::Logout => cli::auth::logout(&opts).await,
        Commands::Status => cli::status::run(&opts).await,
        Commands::Version => {
            println!("flightwatcher version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Search(cmd) => match cmd {
            SearchCommands::List => cli::search::list(&opts).await,
            SearchCommands::Show { id } => cli::search::show(&opts, &id).await,
            SearchCommands::Save {
                name,
                request,
                auto_check,
                interval,
            } => cli::search::save(&opts, &name, &request, auto_check, interval).await,
            SearchCommands::Delete { id } => cli::search::delete(&opts, &id).await,
            SearchCommands::Use { id } => cli::search::use_search(&opts, &id).await,
            SearchCommands::AutoCheck {
                id,
                state,
                interval,
            } => cli::search::auto_check(&opts, &id, state, interval).await,
            SearchCommands::RecordCheck { id, results, test } => {
                cli::search::record_check(&opts, &id, &results, test).await
            }
            SearchCommands::Due => cli::search::due(&opts).await,
            SearchCommands::NewResults { clear } => {
                cli::search::new_results(&opts, clear.as_deref()).await
            }
        },
        Commands::Favorite(cmd) => match cmd {
            FavoriteCommands::List { archived, all } => {
                cli::favorite::list(&opts, archived, all).await
            }
            FavoriteCommands::Add { trip, search } => {
                cli::favorite::add(&opts, &trip, search.as_deref()).await
            }
            FavoriteCommands::Delete { id } => cli::favorite::delete(&opts, &id).await,
            FavoriteCommands::Archive { id } => cli::favorite::archive(&opts, &id).await,
            FavoriteCommands::Status { id, available } => {
                cli::favorite::status(&opts, &id, available).await
            }
            FavoriteCommands::Check { trip } => cli::favorite::check(&opts, &trip).await,
        },
        Commands::Exclude(cmd) => match cmd {
            ExcludeCommands::Set { airport, codes } => {
                cli::exclude::set(&opts, &airport, &codes).await
            }
            ExcludeCommands::Get { airport } => cli::exclude::get(&opts, &airport).await,
            ExcludeCommands::List => cli::exclude::list(&opts).await,
        },
        Commands::Airport(AirportCommands::Search { query, csv }) => {
            cli::airport::search(&opts, &query, csv.as_deref())
        }
        Commands::Cache(cmd) => match cmd {
            CacheCommands::Status => cli::cache::status(&opts).await,
            CacheCommands::Clear => cli::cache::clear(&opts).await,
            CacheCommands::Path => cli::cache::path(),
            CacheCommands::Sweep { older_than_hours } => {
                cli::cache::sweep(&opts, older_than_hours).await
            }
        },
        Commands::Export { output, auto } => {
            cli::export::run(&opts, output.as_deref(), auto).await
        }
        Commands::Migrate => cli::export::migrate(&opts).await,
        Commands::DevMode { state } => cli::export::dev_mode(&opts, state).await,
        Commands::Completion { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "flightwatcher",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
