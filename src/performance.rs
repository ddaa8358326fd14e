use crate::models::*;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    /// Reduce an already filtered trade set into summary statistics.
    ///
    /// The reduction depends only on its input, so the same call serves both the fully
    /// filtered set and the setup-only baseline.
    pub fn aggregate(trades: &[&TradeRecord], profit_factor_cap: f64) -> AggregateStats {
        let total_trades = trades.len();
        if total_trades == 0 {
            return AggregateStats::default();
        }

        let mut r_values = Vec::with_capacity(total_trades);
        let mut win_r_values = Vec::new();
        let mut loss_r_values = Vec::new();
        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut total_pnl = 0.0;
        let mut breakevens = 0;

        for trade in trades.iter().copied() {
            let pnl = trade.pnl();
            total_pnl += pnl;
            r_values.push(trade.r_multiple());

            match trade.result() {
                TradeResult::Win => {
                    gross_profit += pnl;
                    win_r_values.push(trade.r_multiple());
                }
                TradeResult::Loss => {
                    gross_loss += pnl;
                    loss_r_values.push(trade.r_multiple().abs());
                }
                TradeResult::Breakeven => breakevens += 1,
            }
        }

        let wins = win_r_values.len();
        let losses = loss_r_values.len();
        let win_rate = wins as f64 / total_trades as f64 * 100.0;

        let avg_r = Self::finite_mean(&r_values);
        let avg_win_r = Self::finite_mean(&win_r_values);
        let avg_loss_r = Self::finite_mean(&loss_r_values);
        let r_std_dev = if r_values.len() < 2 {
            0.0
        } else {
            let value = r_values.iter().std_dev();
            if value.is_finite() {
                value
            } else {
                0.0
            }
        };

        let win_fraction = wins as f64 / total_trades as f64;
        let loss_fraction = losses as f64 / total_trades as f64;
        let expectancy_r = win_fraction * avg_win_r - loss_fraction * avg_loss_r;

        let profit_factor = Self::profit_factor(gross_profit, gross_loss, wins, profit_factor_cap);

        let best_trade = trades
            .iter()
            .map(|t| t.pnl())
            .fold(f64::NEG_INFINITY, f64::max);
        let worst_trade = trades.iter().map(|t| t.pnl()).fold(f64::INFINITY, f64::min);

        AggregateStats {
            total_trades,
            wins,
            losses,
            breakevens,
            win_rate,
            total_pnl,
            gross_profit,
            gross_loss,
            avg_r,
            avg_win_r,
            avg_loss_r,
            r_std_dev,
            expectancy_r,
            profit_factor,
            best_trade: if best_trade.is_finite() { best_trade } else { 0.0 },
            worst_trade: if worst_trade.is_finite() { worst_trade } else { 0.0 },
        }
    }

    /// Gross profit over gross loss magnitude. With no losing P&L the cap stands in for
    /// "no downside observed" when there was at least one win.
    pub fn profit_factor(gross_profit: f64, gross_loss: f64, wins: usize, cap: f64) -> f64 {
        if gross_loss == 0.0 {
            return if wins > 0 { cap } else { 0.0 };
        }
        (gross_profit / gross_loss.abs()).max(0.0)
    }

    pub fn compare(current: AggregateStats, baseline: AggregateStats) -> StatsComparison {
        StatsComparison {
            win_rate_delta: current.win_rate - baseline.win_rate,
            avg_r_delta: current.avg_r - baseline.avg_r,
            profit_factor_delta: current.profit_factor - baseline.profit_factor,
            current,
            baseline,
        }
    }

    /// Cumulative P&L in chronological order.
    pub fn equity_curve(trades: &[&TradeRecord]) -> Vec<EquityPoint> {
        let mut ordered: Vec<&TradeRecord> = trades.to_vec();
        ordered.sort_by_key(|t| t.datetime());

        let mut equity = 0.0;
        ordered
            .into_iter()
            .map(|trade| {
                equity += trade.pnl();
                EquityPoint {
                    date: trade.date(),
                    time: trade.time(),
                    trade_id: trade.id().to_string(),
                    cumulative_equity: equity,
                }
            })
            .collect()
    }

    /// One bucket per hour of day that has at least one trade, ordered by hour.
    pub fn hourly_buckets(trades: &[&TradeRecord]) -> Vec<HourlyBucket> {
        let mut buckets: BTreeMap<u32, HourlyBucket> = BTreeMap::new();
        for trade in trades {
            let hour = chrono::Timelike::hour(&trade.time());
            let bucket = buckets.entry(hour).or_insert_with(|| HourlyBucket {
                hour,
                ..HourlyBucket::default()
            });
            bucket.pnl += trade.pnl();
            bucket.total += 1;
            match trade.result() {
                TradeResult::Win => bucket.wins += 1,
                TradeResult::Loss => bucket.losses += 1,
                TradeResult::Breakeven => {}
            }
        }
        buckets.into_values().collect()
    }

    /// Mean over finite values only; 0 when none remain.
    fn finite_mean(values: &[f64]) -> f64 {
        let (sum, count) = values
            .iter()
            .filter(|value| value.is_finite())
            .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
        match count {
            0 => 0.0,
            n => sum / n as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROFIT_FACTOR_CAP;
    use crate::input_utils::NumericInput;
    use chrono::{NaiveDate, NaiveTime};

    fn trade(id: &str, day: u32, hour: u32, entry: f64, exit: f64, stop: f64) -> TradeRecord {
        let input = TradeInput {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            time: NaiveTime::from_hms_opt(hour, 15, 0).unwrap(),
            symbol: "TEST".to_string(),
            direction: Direction::Long,
            quantity: Some(NumericInput::Number(1.0)),
            tick_value: Some(NumericInput::Number(1.0)),
            tick_size: Some(NumericInput::Number(1.0)),
            entry_price: Some(NumericInput::Number(entry)),
            exit_price: Some(NumericInput::Number(exit)),
            stop_loss: Some(NumericInput::Number(stop)),
            take_profit: None,
            mfe_price: None,
            commission: None,
            setup_id: None,
            criteria: BucketedCriteria::default(),
            screenshots: Screenshots::default(),
            notes: String::new(),
        };
        TradeRecord::from_input(id.to_string(), &input, 0.25)
    }

    #[test]
    fn empty_set_resolves_to_zero_sentinels() {
        let stats = PerformanceCalculator::aggregate(&[], PROFIT_FACTOR_CAP);
        assert_eq!(stats, AggregateStats::default());
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.profit_factor, 0.0);
    }

    #[test]
    fn three_wins_two_losses() {
        let trades = vec![
            trade("w1", 1, 9, 100.0, 110.0, 95.0),
            trade("w2", 2, 9, 100.0, 110.0, 95.0),
            trade("w3", 3, 9, 100.0, 110.0, 95.0),
            trade("l1", 4, 9, 100.0, 95.0, 95.0),
            trade("l2", 5, 9, 100.0, 95.0, 95.0),
        ];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let stats = PerformanceCalculator::aggregate(&refs, PROFIT_FACTOR_CAP);

        assert_eq!(stats.total_trades, 5);
        assert_eq!(stats.wins, 3);
        assert_eq!(stats.losses, 2);
        assert!((stats.win_rate - 60.0).abs() < 1e-9);
        assert!((stats.total_pnl - 20.0).abs() < 1e-9);
        assert!((stats.profit_factor - 3.0).abs() < 1e-9);
        assert!((stats.avg_win_r - 2.0).abs() < 1e-9);
        assert!((stats.avg_loss_r - 1.0).abs() < 1e-9);
        assert!((stats.avg_r - 0.8).abs() < 1e-9);
        assert!((stats.expectancy_r - 0.8).abs() < 1e-9);
        assert!((stats.best_trade - 10.0).abs() < 1e-9);
        assert!((stats.worst_trade + 5.0).abs() < 1e-9);
        assert!(stats.r_std_dev > 0.0);
    }

    #[test]
    fn breakevens_count_only_in_total() {
        let trades = vec![
            trade("w", 1, 9, 100.0, 104.0, 98.0),
            trade("b", 2, 9, 100.0, 100.0, 98.0),
        ];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let stats = PerformanceCalculator::aggregate(&refs, PROFIT_FACTOR_CAP);
        assert_eq!(stats.total_trades, 2);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.losses, 0);
        assert_eq!(stats.breakevens, 1);
        assert!((stats.win_rate - 50.0).abs() < 1e-9);
        assert_eq!(stats.profit_factor, PROFIT_FACTOR_CAP);
    }

    #[test]
    fn only_breakevens_give_zero_profit_factor() {
        let trades = vec![trade("b", 2, 9, 100.0, 100.0, 98.0)];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let stats = PerformanceCalculator::aggregate(&refs, PROFIT_FACTOR_CAP);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.r_std_dev, 0.0);
    }

    #[test]
    fn comparison_reports_deltas() {
        let trades = vec![
            trade("w", 1, 9, 100.0, 104.0, 98.0),
            trade("l", 2, 9, 100.0, 98.0, 98.0),
        ];
        let all: Vec<&TradeRecord> = trades.iter().collect();
        let winners: Vec<&TradeRecord> = trades.iter().take(1).collect();
        let comparison = PerformanceCalculator::compare(
            PerformanceCalculator::aggregate(&winners, PROFIT_FACTOR_CAP),
            PerformanceCalculator::aggregate(&all, PROFIT_FACTOR_CAP),
        );
        assert!((comparison.win_rate_delta - 50.0).abs() < 1e-9);
        assert!((comparison.avg_r_delta - 1.5).abs() < 1e-9);
    }

    #[test]
    fn equity_curve_is_chronological() {
        let trades = vec![
            trade("late", 3, 14, 100.0, 103.0, 98.0),
            trade("early", 1, 9, 100.0, 98.0, 98.0),
            trade("mid", 3, 10, 100.0, 101.0, 98.0),
        ];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let curve = PerformanceCalculator::equity_curve(&refs);
        let ids: Vec<&str> = curve.iter().map(|p| p.trade_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
        let equity: Vec<f64> = curve.iter().map(|p| p.cumulative_equity).collect();
        assert_eq!(equity, vec![-2.0, -1.0, 2.0]);
    }

    #[test]
    fn hourly_buckets_group_by_hour() {
        let trades = vec![
            trade("a", 1, 9, 100.0, 103.0, 98.0),
            trade("b", 2, 9, 100.0, 98.0, 98.0),
            trade("c", 2, 14, 100.0, 100.0, 98.0),
        ];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let buckets = PerformanceCalculator::hourly_buckets(&refs);
        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[0],
            HourlyBucket {
                hour: 9,
                pnl: 1.0,
                wins: 1,
                losses: 1,
                total: 2
            }
        );
        assert_eq!(buckets[1].hour, 14);
        assert_eq!(buckets[1].total, 1);
        assert_eq!(buckets[1].wins + buckets[1].losses, 0);
    }

    #[test]
    fn rates_and_profit_factor_stay_in_range_for_mixed_sets() {
        let exits = [110.0, 95.0, 100.0, 102.5, 90.0, 100.0, 130.0];
        let stops = [95.0, 100.0, 97.5];
        let trades: Vec<TradeRecord> = exits
            .iter()
            .enumerate()
            .flat_map(|(i, exit)| {
                stops.iter().enumerate().map(move |(j, stop)| {
                    trade(&format!("t{}-{}", i, j), (i + 1) as u32, 9 + j as u32, 100.0, *exit, *stop)
                })
            })
            .collect();

        for size in 1..=trades.len() {
            for start in 0..=(trades.len() - size) {
                let refs: Vec<&TradeRecord> = trades[start..start + size].iter().collect();
                let stats = PerformanceCalculator::aggregate(&refs, PROFIT_FACTOR_CAP);
                assert!(
                    (0.0..=100.0).contains(&stats.win_rate),
                    "win rate {} out of range for {} trade(s) from {}",
                    stats.win_rate,
                    size,
                    start
                );
                assert!(stats.profit_factor >= 0.0);
                assert!(stats.profit_factor <= PROFIT_FACTOR_CAP);
                assert_eq!(stats.wins + stats.losses + stats.breakevens, stats.total_trades);
                assert!(stats.gross_loss <= 0.0);
            }
        }
    }
}
