use crate::context::AppContext;
use crate::models::TradeRecord;
use anyhow::Result;

pub fn run(app: &AppContext, trade_id: &str) -> Result<TradeRecord> {
    let mut loaded = app.load_journal()?;
    let removed = loaded.journal.delete_trade(trade_id)?;
    app.save_journal(&loaded)?;
    Ok(removed)
}
