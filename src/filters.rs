use crate::error::JournalError;
use crate::models::{CriteriaBucket, TradeRecord};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupFilter {
    #[default]
    All,
    Id(String),
}

impl SetupFilter {
    pub fn from_arg(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => SetupFilter::All,
            Some(value) if value.eq_ignore_ascii_case("all") => SetupFilter::All,
            Some(value) => SetupFilter::Id(value.to_string()),
        }
    }

    pub fn matches(&self, trade: &TradeRecord) -> bool {
        match self {
            SetupFilter::All => true,
            SetupFilter::Id(id) => trade.setup_id() == Some(id.as_str()),
        }
    }
}

/// Calendar window relative to the caller's local "today". Weeks start on Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    All,
    Today,
    WeekToDate,
    MonthToDate,
}

impl DateRange {
    /// Inclusive lower bound, or None for an unbounded range.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateRange::All => None,
            DateRange::Today => Some(today),
            DateRange::WeekToDate => {
                Some(today - Duration::days(today.weekday().num_days_from_monday() as i64))
            }
            DateRange::MonthToDate => today.with_day(1),
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self.start_date(today) {
            None => true,
            Some(start) => date >= start && date <= today,
        }
    }
}

impl FromStr for DateRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "week" | "wtd" => Ok(DateRange::WeekToDate),
            "month" | "mtd" => Ok(DateRange::MonthToDate),
            other => Err(anyhow::anyhow!(
                "Unknown date range '{}' (expected all, today, week or month)",
                other
            )),
        }
    }
}

/// A `bucket:name` criterion selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionSelector {
    pub bucket: CriteriaBucket,
    pub name: String,
}

impl CriterionSelector {
    pub fn new(bucket: CriteriaBucket, name: &str) -> Self {
        Self {
            bucket,
            name: name.trim().to_string(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, JournalError> {
        let (bucket, name) = raw
            .split_once(':')
            .ok_or_else(|| JournalError::InvalidSelector(raw.to_string()))?;
        let bucket = bucket
            .parse::<CriteriaBucket>()
            .map_err(|_| JournalError::InvalidSelector(raw.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(JournalError::InvalidSelector(raw.to_string()));
        }
        Ok(Self::new(bucket, name))
    }

    pub fn matches(&self, trade: &TradeRecord) -> bool {
        trade.criteria().contains(self.bucket, &self.name)
    }
}

impl fmt::Display for CriterionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bucket.as_str(), self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    /// Contains-all: extra recorded criteria are allowed.
    #[default]
    Default,
    /// Contains-all plus an exact criteria count, so only the selected combination matches.
    Isolation,
}

pub fn matches_criteria(trade: &TradeRecord, selectors: &[CriterionSelector], mode: MatchMode) -> bool {
    if !selectors.iter().all(|selector| selector.matches(trade)) {
        return false;
    }
    match mode {
        MatchMode::Default => true,
        MatchMode::Isolation => trade.criteria().total_count() == selectors.len(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeFilter {
    pub setup: SetupFilter,
    pub date_range: DateRange,
    pub selectors: Vec<CriterionSelector>,
    pub mode: MatchMode,
}

impl TradeFilter {
    pub fn for_setup(setup: SetupFilter) -> Self {
        Self {
            setup,
            ..Self::default()
        }
    }

    pub fn parse_selectors<S: AsRef<str>>(raw: &[S]) -> Result<Vec<CriterionSelector>, JournalError> {
        raw.iter()
            .map(|value| value.as_ref().trim())
            .filter(|value| !value.is_empty())
            .map(CriterionSelector::parse)
            .collect()
    }

    pub fn matches(&self, trade: &TradeRecord, today: NaiveDate) -> bool {
        self.setup.matches(trade)
            && self.date_range.contains(trade.date(), today)
            && matches_criteria(trade, &self.selectors, self.mode)
    }

    /// Matching trades in their original order.
    pub fn apply<'a>(&self, trades: &'a [TradeRecord], today: NaiveDate) -> Vec<&'a TradeRecord> {
        trades
            .iter()
            .filter(|trade| self.matches(trade, today))
            .collect()
    }

    /// The same setup filter with no date or criteria restriction, used as the comparison baseline.
    pub fn baseline(&self) -> Self {
        Self::for_setup(self.setup.clone())
    }
}

/// Most recent first by date and time; equal timestamps keep their relative order.
pub fn newest_first<'a>(trades: &[&'a TradeRecord]) -> Vec<&'a TradeRecord> {
    let mut ordered = trades.to_vec();
    ordered.sort_by(|a, b| b.datetime().cmp(&a.datetime()));
    ordered
}
