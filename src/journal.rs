use crate::config::JournalSettings;
use crate::error::JournalError;
use crate::filters::{newest_first, TradeFilter};
use crate::models::*;
use crate::net_worth::{self, NetWorthEntry, NetWorthSummary};
use crate::performance::PerformanceCalculator;
use crate::setup_analytics;
use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

pub const UNKNOWN_SETUP_NAME: &str = "Unknown";

/// Trades, setups and the criteria catalog, owned by whoever drives the engine.
#[derive(Debug, Clone, Default)]
pub struct TradeJournal {
    pub(crate) trades: Vec<TradeRecord>,
    pub(crate) setups: Vec<Setup>,
    pub(crate) criteria_library: CriteriaLibrary,
    pub(crate) net_worth: Vec<NetWorthEntry>,
    pub(crate) settings: JournalSettings,
}

impl TradeJournal {
    pub fn new(settings: JournalSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn from_parts(
        trades: Vec<TradeRecord>,
        setups: Vec<Setup>,
        criteria_library: CriteriaLibrary,
        net_worth: Vec<NetWorthEntry>,
        settings: JournalSettings,
    ) -> Self {
        Self {
            trades,
            setups,
            criteria_library,
            net_worth,
            settings,
        }
    }

    pub fn settings(&self) -> &JournalSettings {
        &self.settings
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn setups(&self) -> &[Setup] {
        &self.setups
    }

    pub fn criteria_library(&self) -> &CriteriaLibrary {
        &self.criteria_library
    }

    pub fn net_worth_entries(&self) -> &[NetWorthEntry] {
        &self.net_worth
    }

    pub fn trade(&self, id: &str) -> Option<&TradeRecord> {
        self.trades.iter().find(|t| t.id() == id)
    }

    pub fn trades_newest_first(&self) -> Vec<&TradeRecord> {
        let all: Vec<&TradeRecord> = self.trades.iter().collect();
        newest_first(&all)
    }

    pub fn add_trade(&mut self, input: &TradeInput) -> &TradeRecord {
        let id = Uuid::new_v4().to_string();
        let record = TradeRecord::from_input(id, input, self.settings.default_tick_size);
        info!(
            "Logged trade {} {} {} pnl={:.2} ({})",
            record.id(),
            record.symbol(),
            record.direction().as_str(),
            record.pnl(),
            record.result().as_str()
        );
        self.trades.push(record);
        &self.trades[self.trades.len() - 1]
    }

    /// Replace a trade with edited input, keeping its id.
    pub fn edit_trade(&mut self, id: &str, input: &TradeInput) -> Result<&TradeRecord, JournalError> {
        let default_tick_size = self.settings.default_tick_size;
        let record = self
            .trades
            .iter_mut()
            .find(|t| t.id() == id)
            .ok_or_else(|| JournalError::TradeNotFound(id.to_string()))?;
        record.replace_with(input, default_tick_size);
        info!("Updated trade {} pnl={:.2}", id, record.pnl());
        Ok(&*record)
    }

    pub fn delete_trade(&mut self, id: &str) -> Result<TradeRecord, JournalError> {
        let index = self
            .trades
            .iter()
            .position(|t| t.id() == id)
            .ok_or_else(|| JournalError::TradeNotFound(id.to_string()))?;
        info!("Deleted trade {}", id);
        Ok(self.trades.remove(index))
    }

    pub fn setup(&self, id: &str) -> Option<&Setup> {
        self.setups.iter().find(|s| s.id == id)
    }

    /// Display name for a setup reference; deleted setups resolve to "Unknown".
    pub fn setup_name(&self, id: Option<&str>) -> &str {
        id.and_then(|id| self.setup(id))
            .map(|s| s.name.as_str())
            .unwrap_or(UNKNOWN_SETUP_NAME)
    }

    fn ensure_unique_setup_name(&self, name: &str, except_id: Option<&str>) -> Result<(), JournalError> {
        let taken = self.setups.iter().any(|s| {
            Some(s.id.as_str()) != except_id && s.name.trim().eq_ignore_ascii_case(name.trim())
        });
        if taken {
            return Err(JournalError::DuplicateSetupName(name.trim().to_string()));
        }
        Ok(())
    }

    pub fn add_setup(
        &mut self,
        name: &str,
        color: &str,
        recommended: BucketedCriteria,
    ) -> Result<&Setup, JournalError> {
        self.ensure_unique_setup_name(name, None)?;
        let setup = Setup {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            color: color.trim().to_string(),
            recommended: recommended.normalized(),
        };
        info!("Created setup {} ({})", setup.name, setup.id);
        self.setups.push(setup);
        Ok(&self.setups[self.setups.len() - 1])
    }

    pub fn rename_setup(&mut self, id: &str, name: &str) -> Result<&Setup, JournalError> {
        self.ensure_unique_setup_name(name, Some(id))?;
        let setup = self
            .setups
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| JournalError::SetupNotFound(id.to_string()))?;
        setup.name = name.trim().to_string();
        Ok(&*setup)
    }

    pub fn set_setup_recommended(
        &mut self,
        id: &str,
        recommended: BucketedCriteria,
    ) -> Result<&Setup, JournalError> {
        let setup = self
            .setups
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| JournalError::SetupNotFound(id.to_string()))?;
        setup.recommended = recommended.normalized();
        Ok(&*setup)
    }

    /// Removes the setup only. Trades that referenced it keep the dangling id.
    pub fn delete_setup(&mut self, id: &str) -> Result<Setup, JournalError> {
        let index = self
            .setups
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| JournalError::SetupNotFound(id.to_string()))?;
        let orphaned = self
            .trades
            .iter()
            .filter(|t| t.setup_id() == Some(id))
            .count();
        info!("Deleted setup {} ({} trade(s) keep the reference)", id, orphaned);
        Ok(self.setups.remove(index))
    }

    pub fn add_criterion(&mut self, bucket: CriteriaBucket, name: &str) -> bool {
        self.criteria_library.insert(bucket, name)
    }

    pub fn remove_criterion(&mut self, bucket: CriteriaBucket, name: &str) -> bool {
        self.criteria_library.remove(bucket, name)
    }

    pub fn upsert_net_worth(&mut self, entry: NetWorthEntry) {
        match self.net_worth.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.net_worth.push(entry),
        }
    }

    pub fn remove_net_worth(&mut self, id: &str) -> Result<NetWorthEntry, JournalError> {
        let index = self
            .net_worth
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| JournalError::NetWorthEntryNotFound(id.to_string()))?;
        Ok(self.net_worth.remove(index))
    }

    pub fn net_worth_summary(&self) -> NetWorthSummary {
        net_worth::summarize(&self.net_worth)
    }

    pub fn filtered(&self, filter: &TradeFilter, today: NaiveDate) -> Vec<&TradeRecord> {
        filter.apply(&self.trades, today)
    }

    pub fn stats(&self, filter: &TradeFilter, today: NaiveDate) -> AggregateStats {
        PerformanceCalculator::aggregate(&self.filtered(filter, today), self.settings.profit_factor_cap)
    }

    /// Filtered statistics next to the same setup with no date or criteria restriction.
    pub fn stats_with_baseline(&self, filter: &TradeFilter, today: NaiveDate) -> StatsComparison {
        let current = self.stats(filter, today);
        let baseline = self.stats(&filter.baseline(), today);
        PerformanceCalculator::compare(current, baseline)
    }

    pub fn setup_analytics(&self, filter: &TradeFilter, today: NaiveDate) -> SetupAnalytics {
        setup_analytics::analyze(&self.filtered(filter, today), &self.settings)
    }
}
