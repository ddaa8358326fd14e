use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NetWorthCategory {
    Personal,
    Business,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NetWorthKind {
    Asset,
    Liability,
}

/// One tracked balance in the net-worth panel, e.g. a brokerage account or a loan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetWorthEntry {
    pub id: String,
    pub name: String,
    pub category: NetWorthCategory,
    pub kind: NetWorthKind,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub assets: f64,
    pub liabilities: f64,
    pub net: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetWorthSummary {
    pub personal: CategoryTotals,
    pub business: CategoryTotals,
    pub total_net: f64,
}

/// Liabilities are entered as positive balances and subtracted.
pub fn summarize(entries: &[NetWorthEntry]) -> NetWorthSummary {
    let mut summary = NetWorthSummary::default();
    for entry in entries {
        let value = if entry.value.is_finite() { entry.value.abs() } else { 0.0 };
        let totals = match entry.category {
            NetWorthCategory::Personal => &mut summary.personal,
            NetWorthCategory::Business => &mut summary.business,
        };
        match entry.kind {
            NetWorthKind::Asset => totals.assets += value,
            NetWorthKind::Liability => totals.liabilities += value,
        }
    }
    summary.personal.net = summary.personal.assets - summary.personal.liabilities;
    summary.business.net = summary.business.assets - summary.business.liabilities;
    summary.total_net = summary.personal.net + summary.business.net;
    summary
}
