use crate::config::{JournalSettings, SessionConfig};
use crate::filters::newest_first;
use crate::models::*;
use crate::optimizer::EdgeOptimizer;
use std::collections::BTreeSet;

/// Per-session counts by time of day only. A trade inside the London/New York overlap
/// counts toward both sessions.
pub fn session_performance(trades: &[&TradeRecord], sessions: &SessionConfig) -> SessionPerformance {
    let mut performance = SessionPerformance::default();
    for trade in trades {
        let time = trade.time();
        if sessions.london.contains(time) {
            record_session(&mut performance.london, trade);
        }
        if sessions.new_york.contains(time) {
            record_session(&mut performance.new_york, trade);
        }
    }
    performance
}

fn record_session(stats: &mut SessionStats, trade: &TradeRecord) {
    stats.trades += 1;
    stats.pnl += trade.pnl();
    if trade.result() == TradeResult::Win {
        stats.wins += 1;
    }
}

pub fn trade_frequency(trades: &[&TradeRecord]) -> TradeFrequency {
    let dates: BTreeSet<_> = trades.iter().map(|t| t.date()).collect();
    let weeks = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => {
            let days = (*last - *first).num_days();
            // ceil(days / 7), never below one week
            ((days + 6) / 7).max(1)
        }
        _ => 1,
    };

    TradeFrequency {
        trading_days: dates.len(),
        weeks,
        trades_per_week: trades.len() as f64 / weeks as f64,
    }
}

/// Run of identical results counted back from the most recent trade. A breakeven at the
/// head of history yields a zero-length streak.
pub fn current_streak(trades: &[&TradeRecord]) -> Streak {
    let ordered = newest_first(trades);
    let Some(head) = ordered.first() else {
        return Streak {
            kind: None,
            length: 0,
        };
    };

    let kind = head.result();
    let mut length = 0;
    for trade in &ordered {
        if kind == TradeResult::Breakeven || trade.result() != kind {
            break;
        }
        length += 1;
    }

    Streak {
        kind: Some(kind),
        length,
    }
}

pub fn recent_form(trades: &[&TradeRecord], count: usize) -> Vec<TradeResult> {
    newest_first(trades)
        .into_iter()
        .take(count)
        .map(|trade| trade.result())
        .collect()
}

pub fn analyze(trades: &[&TradeRecord], settings: &JournalSettings) -> SetupAnalytics {
    let frequency = trade_frequency(trades);
    let best_edge = EdgeOptimizer::new(settings.edge_sweep)
        .sweep(trades)
        .map(|report| report.best);

    SetupAnalytics {
        sessions: session_performance(trades, &settings.sessions),
        best_edge,
        trades_per_week: frequency.trades_per_week,
        frequency,
        streak: current_streak(trades),
        recent_form: recent_form(trades, settings.recent_form_length),
    }
}
