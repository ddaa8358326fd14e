use crate::commands::FilterArgs;
use crate::context::AppContext;
use crate::models::EdgeReport;
use crate::optimizer::EdgeOptimizer;
use anyhow::Result;
use log::info;

pub fn run(app: &AppContext, args: &FilterArgs) -> Result<Option<EdgeReport>> {
    let filter = args.to_filter()?;
    let loaded = app.load_journal()?;
    let journal = &loaded.journal;
    let trades = journal.filtered(&filter, app.today());
    let report = EdgeOptimizer::new(journal.settings().edge_sweep).sweep(&trades);

    match &report {
        Some(report) => info!(
            "Best edge at {:.1}R: win rate {:.1}%, expectancy {:.3}R over {} trade(s)",
            report.best.target_r,
            report.best.win_rate,
            report.best.expectancy,
            report.evaluated_trades
        ),
        None => info!("No trades match the filter; edge sweep skipped"),
    }
    Ok(report)
}
