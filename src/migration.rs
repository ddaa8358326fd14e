//! Upgrades stored journal data of any historical shape into the current model before
//! any business logic sees it.

use crate::config::{parse_time, JournalSettings};
use crate::error::JournalError;
use crate::input_utils::NumericInput;
use crate::journal::TradeJournal;
use crate::models::*;
use crate::net_worth::NetWorthEntry;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Snapshots without a version field predate bucketed criteria.
pub const LEGACY_SNAPSHOT_VERSION: u32 = 1;
pub const CURRENT_SNAPSHOT_VERSION: u32 = 2;

/// Criteria as stored: a flat list from before timeframe buckets existed, or the bucketed object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredCriteria {
    Flat(Vec<String>),
    Bucketed(BucketedCriteria),
}

impl StoredCriteria {
    /// Flat lists land in the higher-timeframe bucket.
    pub fn upgrade(self) -> (BucketedCriteria, bool) {
        match self {
            StoredCriteria::Flat(names) => {
                let criteria = BucketedCriteria {
                    htf: names,
                    ..BucketedCriteria::default()
                };
                (criteria.normalized(), true)
            }
            StoredCriteria::Bucketed(criteria) => (criteria.normalized(), false),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredScreenshots {
    Single(String),
    Bucketed(Screenshots),
}

impl StoredScreenshots {
    /// A lone screenshot was always the entry chart, so it fills the entry-timeframe slot.
    pub fn upgrade(self) -> (Screenshots, bool) {
        match self {
            StoredScreenshots::Single(reference) => (
                Screenshots {
                    etf: Some(reference).filter(|r| !r.trim().is_empty()),
                    ..Screenshots::default()
                },
                true,
            ),
            StoredScreenshots::Bucketed(screenshots) => (screenshots, false),
        }
    }
}

/// A trade as found on disk. Stored derived fields are ignored and recomputed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTrade {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub quantity: Option<NumericInput>,
    #[serde(default)]
    pub tick_value: Option<NumericInput>,
    #[serde(default)]
    pub tick_size: Option<NumericInput>,
    #[serde(default, alias = "entry")]
    pub entry_price: Option<NumericInput>,
    #[serde(default, alias = "exit")]
    pub exit_price: Option<NumericInput>,
    #[serde(default)]
    pub stop_loss: Option<NumericInput>,
    #[serde(default)]
    pub take_profit: Option<NumericInput>,
    #[serde(default, alias = "mfe")]
    pub mfe_price: Option<NumericInput>,
    #[serde(default, alias = "commissions")]
    pub commission: Option<NumericInput>,
    #[serde(default, alias = "setup")]
    pub setup_id: Option<String>,
    #[serde(default)]
    pub criteria: Option<StoredCriteria>,
    #[serde(default, alias = "images")]
    pub screenshots: Option<StoredScreenshots>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSetup {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "criteria")]
    pub recommended: Option<StoredCriteria>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredJournal {
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub trades: Vec<StoredTrade>,
    #[serde(default)]
    pub setups: Vec<StoredSetup>,
    #[serde(default, alias = "criteria_library")]
    pub criteria_library: Option<StoredCriteria>,
    #[serde(default, alias = "net_worth")]
    pub net_worth: Vec<NetWorthEntry>,
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

/// Current on-disk shape written back after ingestion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalSnapshot<'a> {
    pub version: u32,
    pub trades: &'a [TradeRecord],
    pub setups: &'a [Setup],
    pub criteria_library: &'a CriteriaLibrary,
    pub net_worth: &'a [NetWorthEntry],
    pub settings: &'a HashMap<String, String>,
}

impl<'a> JournalSnapshot<'a> {
    pub fn new(journal: &'a TradeJournal, settings: &'a HashMap<String, String>) -> Self {
        Self {
            version: CURRENT_SNAPSHOT_VERSION,
            trades: journal.trades(),
            setups: journal.setups(),
            criteria_library: journal.criteria_library(),
            net_worth: journal.net_worth_entries(),
            settings,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub source_version: u32,
    pub trades_loaded: usize,
    pub trades_skipped: usize,
    pub setups_loaded: usize,
    pub flat_criteria_upgraded: usize,
    pub single_images_upgraded: usize,
}

impl MigrationReport {
    pub fn changed_shape(&self) -> bool {
        self.source_version != CURRENT_SNAPSHOT_VERSION
            || self.flat_criteria_upgraded > 0
            || self.single_images_upgraded > 0
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        })
}

/// Convert one stored trade into raw input plus its id. Returns None when the trade has
/// no usable date.
pub fn upgrade_trade(stored: StoredTrade, report: &mut MigrationReport) -> Option<(String, TradeInput)> {
    let id = stored
        .id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let Some(date) = stored.date.as_deref().and_then(parse_date) else {
        warn!("Skipping trade {}: missing or invalid date {:?}", id, stored.date);
        return None;
    };

    let time = match stored.time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        None => NaiveTime::MIN,
        Some(raw) => parse_time(raw).unwrap_or_else(|error| {
            warn!("Trade {}: {}; using midnight", id, error);
            NaiveTime::MIN
        }),
    };

    let direction = match stored.direction.as_deref() {
        None => Direction::Long,
        Some(raw) => raw.parse().unwrap_or_else(|error| {
            warn!("Trade {}: {}; treating as Long", id, error);
            Direction::Long
        }),
    };

    let criteria = match stored.criteria {
        None => BucketedCriteria::default(),
        Some(stored_criteria) => {
            let (criteria, upgraded) = stored_criteria.upgrade();
            if upgraded {
                report.flat_criteria_upgraded += 1;
            }
            criteria
        }
    };

    let screenshots = match (stored.screenshots, stored.image) {
        (Some(stored_screenshots), _) => {
            let (screenshots, upgraded) = stored_screenshots.upgrade();
            if upgraded {
                report.single_images_upgraded += 1;
            }
            screenshots
        }
        (None, Some(image)) => {
            let (screenshots, _) = StoredScreenshots::Single(image).upgrade();
            report.single_images_upgraded += 1;
            screenshots
        }
        (None, None) => Screenshots::default(),
    };

    let input = TradeInput {
        date,
        time,
        symbol: stored.symbol,
        direction,
        quantity: stored.quantity,
        tick_value: stored.tick_value,
        tick_size: stored.tick_size,
        entry_price: stored.entry_price,
        exit_price: stored.exit_price,
        stop_loss: stored.stop_loss,
        take_profit: stored.take_profit,
        mfe_price: stored.mfe_price,
        commission: stored.commission,
        setup_id: stored.setup_id,
        criteria,
        screenshots,
        notes: stored.notes.unwrap_or_default(),
    };
    Some((id, input))
}

pub fn upgrade_setup(stored: StoredSetup, report: &mut MigrationReport) -> Setup {
    let recommended = match stored.recommended {
        None => BucketedCriteria::default(),
        Some(stored_criteria) => {
            let (criteria, upgraded) = stored_criteria.upgrade();
            if upgraded {
                report.flat_criteria_upgraded += 1;
            }
            criteria
        }
    };
    Setup {
        id: stored
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        name: stored.name.trim().to_string(),
        color: stored.color.unwrap_or_default(),
        recommended,
    }
}

/// Normalize a stored journal into caller-owned state, recomputing every derived field.
pub fn ingest(
    stored: StoredJournal,
    settings: JournalSettings,
) -> Result<(TradeJournal, MigrationReport), JournalError> {
    let source_version = stored.version.unwrap_or(LEGACY_SNAPSHOT_VERSION);
    if source_version > CURRENT_SNAPSHOT_VERSION {
        return Err(JournalError::UnsupportedVersion {
            found: source_version,
            supported: CURRENT_SNAPSHOT_VERSION,
        });
    }

    let mut report = MigrationReport {
        source_version,
        ..MigrationReport::default()
    };

    let mut trades = Vec::with_capacity(stored.trades.len());
    for stored_trade in stored.trades {
        match upgrade_trade(stored_trade, &mut report) {
            Some((id, input)) => {
                trades.push(TradeRecord::from_input(id, &input, settings.default_tick_size));
            }
            None => report.trades_skipped += 1,
        }
    }
    report.trades_loaded = trades.len();

    let setups: Vec<Setup> = stored
        .setups
        .into_iter()
        .map(|setup| upgrade_setup(setup, &mut report))
        .collect();
    report.setups_loaded = setups.len();

    let criteria_library = match stored.criteria_library {
        None => CriteriaLibrary::default(),
        Some(library) => library.upgrade().0,
    };

    if report.changed_shape() {
        info!(
            "Upgraded journal from version {} ({} flat criteria list(s), {} single image(s))",
            source_version, report.flat_criteria_upgraded, report.single_images_upgraded
        );
    }

    Ok((
        TradeJournal::from_parts(trades, setups, criteria_library, stored.net_worth, settings),
        report,
    ))
}
