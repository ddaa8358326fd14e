use crate::context::AppContext;
use crate::net_worth::NetWorthSummary;
use anyhow::Result;

pub fn run(app: &AppContext) -> Result<NetWorthSummary> {
    let loaded = app.load_journal()?;
    Ok(loaded.journal.net_worth_summary())
}
