use crate::context::AppContext;
use crate::models::{TradeInput, TradeRecord};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Log a trade from a JSON trade input file and persist the journal.
pub fn run(app: &AppContext, input_path: &Path) -> Result<TradeRecord> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open trade input at {}", input_path.display()))?;
    let input: TradeInput = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid trade input in {}", input_path.display()))?;

    let mut loaded = app.load_journal()?;
    let record = loaded.journal.add_trade(&input).clone();
    app.save_journal(&loaded)?;
    Ok(record)
}
