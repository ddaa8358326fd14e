use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use journal::{
    commands::{
        add_trade, analytics, delete_trade, edge, equity, hourly, migrate, net_worth, print_json,
        stats, FilterArgs,
    },
    context::AppContext,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Trade journal performance and edge analytics")]
struct Cli {
    /// Journal JSON file (defaults to $JOURNAL_FILE, then ./journal.json)
    #[arg(long, global = true, value_name = "PATH")]
    journal: Option<PathBuf>,
    /// Evaluate date ranges as of this day (YYYY-MM-DD) instead of the local date
    #[arg(long, global = true, value_name = "DATE")]
    today: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate statistics for the filtered trades, compared with the setup baseline
    Stats {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Sweep fixed R targets over the filtered trades and report the best edge
    Edge {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Session, frequency, streak and recent-form analytics for a setup
    Analytics {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Cumulative P&L curve in chronological order
    Equity {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// P&L and win/loss counts per hour of day
    Hourly {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Personal and business net worth totals
    NetWorth,
    /// Rewrite a legacy journal file in the current format
    Migrate {
        /// Destination file (defaults to rewriting the journal in place)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Log a trade from a JSON trade input file
    AddTrade {
        /// Trade input JSON file
        #[arg(long = "input", value_name = "PATH")]
        input: PathBuf,
    },
    /// Delete a trade by id
    DeleteTrade {
        trade_id: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let today = cli
        .today
        .as_deref()
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("Invalid --today value '{}', expected YYYY-MM-DD", raw))
        })
        .transpose()?;
    let app_context = AppContext::initialize(cli.journal, today);

    info!(
        "Starting journal analytics on {} as of {}. Past performance does not predict future results.",
        app_context.journal_path().display(),
        app_context.today()
    );

    match cli.command {
        Commands::Stats { filter } => print_json(&stats::run(&app_context, &filter)?)?,
        Commands::Edge { filter } => print_json(&edge::run(&app_context, &filter)?)?,
        Commands::Analytics { filter } => print_json(&analytics::run(&app_context, &filter)?)?,
        Commands::Equity { filter } => print_json(&equity::run(&app_context, &filter)?)?,
        Commands::Hourly { filter } => print_json(&hourly::run(&app_context, &filter)?)?,
        Commands::NetWorth => print_json(&net_worth::run(&app_context)?)?,
        Commands::Migrate { output } => {
            print_json(&migrate::run(&app_context, output.as_deref())?)?
        }
        Commands::AddTrade { input } => print_json(&add_trade::run(&app_context, &input)?)?,
        Commands::DeleteTrade { trade_id } => {
            print_json(&delete_trade::run(&app_context, &trade_id)?)?
        }
    }

    Ok(())
}
