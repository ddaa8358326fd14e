use crate::error::JournalError;
use crate::input_utils::NumericInput;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }
}

impl FromStr for Direction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(anyhow::anyhow!("Unknown trade direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeResult {
    Win,
    Loss,
    Breakeven,
}

impl TradeResult {
    pub fn from_pnl(pnl: f64) -> Self {
        if pnl > 0.0 {
            TradeResult::Win
        } else if pnl < 0.0 {
            TradeResult::Loss
        } else {
            TradeResult::Breakeven
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeResult::Win => "WIN",
            TradeResult::Loss => "LOSS",
            TradeResult::Breakeven => "BREAKEVEN",
        }
    }
}

/// Timeframe scope of a criterion: higher-timeframe context, lower-timeframe
/// sequence or entry-timeframe trigger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CriteriaBucket {
    Htf,
    Ltf,
    Etf,
}

impl CriteriaBucket {
    pub const ALL: [CriteriaBucket; 3] = [CriteriaBucket::Htf, CriteriaBucket::Ltf, CriteriaBucket::Etf];

    pub fn as_str(&self) -> &'static str {
        match self {
            CriteriaBucket::Htf => "htf",
            CriteriaBucket::Ltf => "ltf",
            CriteriaBucket::Etf => "etf",
        }
    }
}

impl FromStr for CriteriaBucket {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "htf" => Ok(CriteriaBucket::Htf),
            "ltf" => Ok(CriteriaBucket::Ltf),
            "etf" => Ok(CriteriaBucket::Etf),
            other => Err(JournalError::UnknownBucket(other.to_string())),
        }
    }
}

/// Normalized comparison key for criterion names.
pub fn criterion_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Criterion names split by timeframe bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BucketedCriteria {
    #[serde(default)]
    pub htf: Vec<String>,
    #[serde(default)]
    pub ltf: Vec<String>,
    #[serde(default)]
    pub etf: Vec<String>,
}

impl BucketedCriteria {
    pub fn get(&self, bucket: CriteriaBucket) -> &[String] {
        match bucket {
            CriteriaBucket::Htf => &self.htf,
            CriteriaBucket::Ltf => &self.ltf,
            CriteriaBucket::Etf => &self.etf,
        }
    }

    fn get_mut(&mut self, bucket: CriteriaBucket) -> &mut Vec<String> {
        match bucket {
            CriteriaBucket::Htf => &mut self.htf,
            CriteriaBucket::Ltf => &mut self.ltf,
            CriteriaBucket::Etf => &mut self.etf,
        }
    }

    pub fn total_count(&self) -> usize {
        self.htf.len() + self.ltf.len() + self.etf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    pub fn contains(&self, bucket: CriteriaBucket, name: &str) -> bool {
        let key = criterion_key(name);
        self.get(bucket)
            .iter()
            .any(|existing| criterion_key(existing) == key)
    }

    /// Adds a name unless an equivalent one is already present. Returns whether it was added.
    pub fn insert(&mut self, bucket: CriteriaBucket, name: &str) -> bool {
        let trimmed = name.trim();
        if trimmed.is_empty() || self.contains(bucket, trimmed) {
            return false;
        }
        self.get_mut(bucket).push(trimmed.to_string());
        true
    }

    pub fn remove(&mut self, bucket: CriteriaBucket, name: &str) -> bool {
        let key = criterion_key(name);
        let names = self.get_mut(bucket);
        let before = names.len();
        names.retain(|existing| criterion_key(existing) != key);
        names.len() != before
    }

    /// Trims names, drops blanks and removes case-insensitive duplicates, keeping first spellings.
    pub fn normalized(&self) -> Self {
        let mut cleaned = Self::default();
        for bucket in CriteriaBucket::ALL {
            for name in self.get(bucket) {
                cleaned.insert(bucket, name);
            }
        }
        cleaned
    }
}

/// Global catalog of known criterion names, used to populate selection lists.
pub type CriteriaLibrary = BucketedCriteria;

/// Opaque screenshot references, one per timeframe bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Screenshots {
    #[serde(default)]
    pub htf: Option<String>,
    #[serde(default)]
    pub ltf: Option<String>,
    #[serde(default)]
    pub etf: Option<String>,
}

/// Raw trade input as submitted by the user. Numeric fields keep whatever was typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInput {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub symbol: String,
    pub direction: Direction,
    #[serde(default)]
    pub quantity: Option<NumericInput>,
    #[serde(default)]
    pub tick_value: Option<NumericInput>,
    #[serde(default)]
    pub tick_size: Option<NumericInput>,
    #[serde(default)]
    pub entry_price: Option<NumericInput>,
    #[serde(default)]
    pub exit_price: Option<NumericInput>,
    #[serde(default)]
    pub stop_loss: Option<NumericInput>,
    #[serde(default)]
    pub take_profit: Option<NumericInput>,
    #[serde(default)]
    pub mfe_price: Option<NumericInput>,
    #[serde(default)]
    pub commission: Option<NumericInput>,
    #[serde(default)]
    pub setup_id: Option<String>,
    #[serde(default)]
    pub criteria: BucketedCriteria,
    #[serde(default)]
    pub screenshots: Screenshots,
    #[serde(default)]
    pub notes: String,
}

/// Resolved numeric inputs of a trade after coercion and defaulting.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeEconomics {
    pub direction: Direction,
    pub quantity: u32,
    pub tick_value: f64,
    pub tick_size: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub mfe_price: Option<f64>,
    pub commission: f64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFields {
    pub pnl: f64,
    pub r_multiple: f64,
    pub result: TradeResult,
    pub risk_per_unit: f64,
    pub reward_per_unit: f64,
    pub max_favorable_move_points: Option<f64>,
}

/// One logged trade. Derived fields are only ever produced from the raw inputs, so
/// the record is built through [`TradeRecord::from_input`] and changed through
/// [`TradeRecord::replace_with`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub(crate) id: String,
    pub(crate) date: NaiveDate,
    pub(crate) time: NaiveTime,
    pub(crate) symbol: String,
    #[serde(flatten)]
    pub(crate) economics: TradeEconomics,
    pub(crate) setup_id: Option<String>,
    pub(crate) criteria: BucketedCriteria,
    pub(crate) screenshots: Screenshots,
    pub(crate) notes: String,
    #[serde(flatten)]
    pub(crate) derived: DerivedFields,
}

impl TradeRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn direction(&self) -> Direction {
        self.economics.direction
    }

    pub fn economics(&self) -> &TradeEconomics {
        &self.economics
    }

    pub fn setup_id(&self) -> Option<&str> {
        self.setup_id.as_deref()
    }

    pub fn criteria(&self) -> &BucketedCriteria {
        &self.criteria
    }

    pub fn screenshots(&self) -> &Screenshots {
        &self.screenshots
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn derived(&self) -> &DerivedFields {
        &self.derived
    }

    pub fn pnl(&self) -> f64 {
        self.derived.pnl
    }

    pub fn r_multiple(&self) -> f64 {
        self.derived.r_multiple
    }

    pub fn result(&self) -> TradeResult {
        self.derived.result
    }

    /// Rebuilds the raw input this record was created from, with numbers already resolved.
    pub fn to_input(&self) -> TradeInput {
        let economics = &self.economics;
        TradeInput {
            date: self.date,
            time: self.time,
            symbol: self.symbol.clone(),
            direction: economics.direction,
            quantity: Some(NumericInput::Number(economics.quantity as f64)),
            tick_value: Some(NumericInput::Number(economics.tick_value)),
            tick_size: Some(NumericInput::Number(economics.tick_size)),
            entry_price: Some(NumericInput::Number(economics.entry_price)),
            exit_price: Some(NumericInput::Number(economics.exit_price)),
            stop_loss: Some(NumericInput::Number(economics.stop_loss)),
            take_profit: Some(NumericInput::Number(economics.take_profit)),
            mfe_price: economics.mfe_price.map(NumericInput::Number),
            commission: Some(NumericInput::Number(economics.commission)),
            setup_id: self.setup_id.clone(),
            criteria: self.criteria.clone(),
            screenshots: self.screenshots.clone(),
            notes: self.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Setup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub recommended: BucketedCriteria,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub avg_r: f64,
    pub avg_win_r: f64,
    pub avg_loss_r: f64,
    pub r_std_dev: f64,
    pub expectancy_r: f64,
    pub profit_factor: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
}

/// Current (fully filtered) statistics next to the setup-only baseline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsComparison {
    pub current: AggregateStats,
    pub baseline: AggregateStats,
    pub win_rate_delta: f64,
    pub avg_r_delta: f64,
    pub profit_factor_delta: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub trade_id: String,
    pub cumulative_equity: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBucket {
    pub hour: u32,
    pub pnl: f64,
    pub wins: usize,
    pub losses: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub trades: usize,
    pub wins: usize,
    pub pnl: f64,
}

impl SessionStats {
    pub fn win_rate(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            self.wins as f64 / self.trades as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionPerformance {
    pub london: SessionStats,
    pub new_york: SessionStats,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeFrequency {
    pub trading_days: usize,
    pub weeks: i64,
    pub trades_per_week: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub kind: Option<TradeResult>,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgePoint {
    pub target_r: f64,
    pub wins: usize,
    pub losses: usize,
    pub breakevens: usize,
    pub win_rate: f64,
    pub expectancy: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EdgeReport {
    pub evaluated_trades: usize,
    pub skipped_trades: usize,
    pub curve: Vec<EdgePoint>,
    pub best: EdgePoint,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupAnalytics {
    pub sessions: SessionPerformance,
    pub best_edge: Option<EdgePoint>,
    pub frequency: TradeFrequency,
    pub trades_per_week: f64,
    pub streak: Streak,
    pub recent_form: Vec<TradeResult>,
}
