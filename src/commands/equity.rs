use crate::commands::FilterArgs;
use crate::context::AppContext;
use crate::models::EquityPoint;
use crate::performance::PerformanceCalculator;
use anyhow::Result;

pub fn run(app: &AppContext, args: &FilterArgs) -> Result<Vec<EquityPoint>> {
    let filter = args.to_filter()?;
    let loaded = app.load_journal()?;
    let trades = loaded.journal.filtered(&filter, app.today());
    Ok(PerformanceCalculator::equity_curve(&trades))
}
