use crate::filters::{MatchMode, SetupFilter, TradeFilter};
use anyhow::Result;
use clap::Args;
use serde::Serialize;

pub mod add_trade;
pub mod analytics;
pub mod delete_trade;
pub mod edge;
pub mod equity;
pub mod hourly;
pub mod migrate;
pub mod net_worth;
pub mod stats;

/// Trade selection shared by the reporting commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Setup id to restrict to (`all` or omitted for every setup)
    #[arg(long)]
    pub setup: Option<String>,
    /// Date range relative to today: all, today, week or month
    #[arg(long, default_value = "all")]
    pub range: String,
    /// Criterion selectors as bucket:name, bucket being htf, ltf or etf
    #[arg(long = "criteria", value_delimiter = ',', num_args = 1..)]
    pub criteria: Vec<String>,
    /// Only match trades whose recorded criteria are exactly the selected set
    #[arg(long)]
    pub isolate: bool,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<TradeFilter> {
        Ok(TradeFilter {
            setup: SetupFilter::from_arg(self.setup.as_deref()),
            date_range: self.range.parse()?,
            selectors: TradeFilter::parse_selectors(&self.criteria)?,
            mode: if self.isolate {
                MatchMode::Isolation
            } else {
                MatchMode::Default
            },
        })
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
