use crate::commands::FilterArgs;
use crate::context::AppContext;
use crate::filters::SetupFilter;
use crate::models::SetupAnalytics;
use anyhow::Result;
use log::info;

pub fn run(app: &AppContext, args: &FilterArgs) -> Result<SetupAnalytics> {
    let filter = args.to_filter()?;
    let loaded = app.load_journal()?;
    let journal = &loaded.journal;

    let analytics = journal.setup_analytics(&filter, app.today());
    match &filter.setup {
        SetupFilter::All => info!("Analytics across all setups"),
        SetupFilter::Id(id) => info!(
            "Analytics for setup {}: {:.2} trade(s) per week, streak {}",
            journal.setup_name(Some(id.as_str())),
            analytics.trades_per_week,
            analytics.streak.length
        ),
    }
    Ok(analytics)
}
