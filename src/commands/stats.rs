use crate::commands::FilterArgs;
use crate::context::AppContext;
use crate::models::StatsComparison;
use anyhow::Result;
use log::info;

pub fn run(app: &AppContext, args: &FilterArgs) -> Result<StatsComparison> {
    let filter = args.to_filter()?;
    let loaded = app.load_journal()?;
    let comparison = loaded.journal.stats_with_baseline(&filter, app.today());
    info!(
        "{} trade(s) match ({} for the setup baseline): win rate {:.1}%, profit factor {:.2}, total P&L {:.2}",
        comparison.current.total_trades,
        comparison.baseline.total_trades,
        comparison.current.win_rate,
        comparison.current.profit_factor,
        comparison.current.total_pnl
    );
    Ok(comparison)
}
