use crate::config::EdgeSweepConfig;
use crate::models::{EdgePoint, EdgeReport, TradeRecord, TradeResult};
use crate::trade_math::favorable_diff;
use log::debug;
use std::cmp::Ordering;

/// Simulated outcome of a trade under a fixed R target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedOutcome {
    Win,
    Loss,
    Breakeven,
}

/// Replays the filtered trades against a ladder of profit targets: "had I exited once
/// favorable excursion reached X R, what would the win rate and expectancy have been?"
pub struct EdgeOptimizer {
    config: EdgeSweepConfig,
}

impl Default for EdgeOptimizer {
    fn default() -> Self {
        Self::new(EdgeSweepConfig::default())
    }
}

impl EdgeOptimizer {
    pub fn new(config: EdgeSweepConfig) -> Self {
        Self { config }
    }

    /// Favorable excursion of a trade in R, or None when the trade risked nothing.
    ///
    /// Without a recorded MFE price the exit price stands in for winners and the entry
    /// price for everything else.
    pub fn excursion_r(trade: &TradeRecord) -> Option<f64> {
        let economics = trade.economics();
        let risk = (economics.entry_price - economics.stop_loss).abs();
        if risk == 0.0 {
            return None;
        }

        let mfe_price = economics.mfe_price.unwrap_or(match trade.result() {
            TradeResult::Win => economics.exit_price,
            _ => economics.entry_price,
        });
        let favorable_move =
            favorable_diff(economics.direction, economics.entry_price, mfe_price).max(0.0);
        Some(favorable_move / risk)
    }

    pub fn classify(&self, trade: &TradeRecord, mfe_r: f64, target_r: f64) -> SimulatedOutcome {
        if mfe_r >= target_r {
            SimulatedOutcome::Win
        } else if trade.result() == TradeResult::Loss || mfe_r < self.config.min_move_r {
            SimulatedOutcome::Loss
        } else {
            SimulatedOutcome::Breakeven
        }
    }

    /// Full curve over every sampled target plus the target with the highest expectancy.
    /// Returns None for an empty trade set.
    pub fn sweep(&self, trades: &[&TradeRecord]) -> Option<EdgeReport> {
        if trades.is_empty() {
            return None;
        }

        let evaluated: Vec<(&TradeRecord, f64)> = trades
            .iter()
            .filter_map(|trade| Self::excursion_r(trade).map(|mfe_r| (*trade, mfe_r)))
            .collect();
        let skipped_trades = trades.len() - evaluated.len();

        let curve: Vec<EdgePoint> = self
            .config
            .targets()
            .into_iter()
            .map(|target_r| self.evaluate_target(&evaluated, target_r))
            .collect();

        let best = curve
            .iter()
            .fold(None::<&EdgePoint>, |best, point| match best {
                Some(current)
                    if point
                        .expectancy
                        .partial_cmp(&current.expectancy)
                        .unwrap_or(Ordering::Equal)
                        != Ordering::Greater =>
                {
                    Some(current)
                }
                _ => Some(point),
            })?
            .clone();

        debug!(
            "Edge sweep over {} trades ({} skipped for zero risk): best target {:.1}R expectancy {:.3}",
            evaluated.len(),
            skipped_trades,
            best.target_r,
            best.expectancy
        );

        Some(EdgeReport {
            evaluated_trades: evaluated.len(),
            skipped_trades,
            curve,
            best,
        })
    }

    fn evaluate_target(&self, evaluated: &[(&TradeRecord, f64)], target_r: f64) -> EdgePoint {
        let mut wins = 0;
        let mut losses = 0;
        let mut breakevens = 0;

        for (trade, mfe_r) in evaluated {
            match self.classify(trade, *mfe_r, target_r) {
                SimulatedOutcome::Win => wins += 1,
                SimulatedOutcome::Loss => losses += 1,
                SimulatedOutcome::Breakeven => breakevens += 1,
            }
        }

        let (win_fraction, loss_fraction) = if evaluated.is_empty() {
            (0.0, 0.0)
        } else {
            let count = evaluated.len() as f64;
            (wins as f64 / count, losses as f64 / count)
        };

        EdgePoint {
            target_r,
            wins,
            losses,
            breakevens,
            win_rate: win_fraction * 100.0,
            expectancy: win_fraction * target_r - loss_fraction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_utils::NumericInput;
    use crate::models::{BucketedCriteria, Direction, Screenshots, TradeInput};
    use chrono::{NaiveDate, NaiveTime};

    fn trade(direction: Direction, entry: f64, exit: f64, stop: f64, mfe: Option<f64>) -> TradeRecord {
        let input = TradeInput {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            symbol: "TEST".to_string(),
            direction,
            quantity: Some(NumericInput::Number(1.0)),
            tick_value: Some(NumericInput::Number(1.0)),
            tick_size: Some(NumericInput::Number(1.0)),
            entry_price: Some(NumericInput::Number(entry)),
            exit_price: Some(NumericInput::Number(exit)),
            stop_loss: Some(NumericInput::Number(stop)),
            take_profit: None,
            mfe_price: mfe.map(NumericInput::Number),
            commission: None,
            setup_id: None,
            criteria: BucketedCriteria::default(),
            screenshots: Screenshots::default(),
            notes: String::new(),
        };
        TradeRecord::from_input("t".to_string(), &input, 0.25)
    }

    #[test]
    fn empty_set_is_skipped() {
        assert!(EdgeOptimizer::default().sweep(&[]).is_none());
    }

    #[test]
    fn excursion_falls_back_to_exit_for_winners_and_entry_otherwise() {
        let winner = trade(Direction::Long, 100.0, 106.0, 98.0, None);
        assert_eq!(EdgeOptimizer::excursion_r(&winner), Some(3.0));

        let loser = trade(Direction::Long, 100.0, 98.0, 98.0, None);
        assert_eq!(EdgeOptimizer::excursion_r(&loser), Some(0.0));

        let short_with_mfe = trade(Direction::Short, 100.0, 101.0, 102.0, Some(97.0));
        assert_eq!(EdgeOptimizer::excursion_r(&short_with_mfe), Some(1.5));

        let adverse_mfe = trade(Direction::Long, 100.0, 99.0, 98.0, Some(99.5));
        assert_eq!(EdgeOptimizer::excursion_r(&adverse_mfe), Some(0.0));

        let no_risk = trade(Direction::Long, 100.0, 104.0, 100.0, None);
        assert_eq!(EdgeOptimizer::excursion_r(&no_risk), None);
    }

    #[test]
    fn classification_thresholds() {
        let optimizer = EdgeOptimizer::default();
        let loser = trade(Direction::Long, 100.0, 98.0, 98.0, Some(101.0));
        let scratch = trade(Direction::Long, 100.0, 100.0, 98.0, Some(100.6));

        assert_eq!(optimizer.classify(&loser, 0.5, 0.5), SimulatedOutcome::Win);
        assert_eq!(optimizer.classify(&loser, 0.5, 1.0), SimulatedOutcome::Loss);
        assert_eq!(optimizer.classify(&scratch, 0.3, 1.0), SimulatedOutcome::Breakeven);
        assert_eq!(optimizer.classify(&scratch, 0.1, 1.0), SimulatedOutcome::Loss);
    }

    #[test]
    fn sweep_finds_best_expectancy() {
        // Excursions of 1R, 2R, 3R and a clean 0R loser.
        let trades = vec![
            trade(Direction::Long, 100.0, 102.0, 98.0, Some(102.0)),
            trade(Direction::Long, 100.0, 104.0, 98.0, Some(104.0)),
            trade(Direction::Long, 100.0, 106.0, 98.0, Some(106.0)),
            trade(Direction::Long, 100.0, 98.0, 98.0, None),
        ];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let report = EdgeOptimizer::default().sweep(&refs).unwrap();

        assert_eq!(report.curve.len(), 20);
        assert_eq!(report.evaluated_trades, 4);
        assert_eq!(report.skipped_trades, 0);

        let at_two = report.curve.iter().find(|p| (p.target_r - 2.0).abs() < 1e-9).unwrap();
        assert_eq!((at_two.wins, at_two.losses, at_two.breakevens), (2, 1, 1));
        assert!((at_two.win_rate - 50.0).abs() < 1e-9);
        assert!((at_two.expectancy - 0.75).abs() < 1e-9);

        // 1.0R -> 0.5, 2.0R -> 0.75, 3.0R -> 0.5
        assert!((report.best.target_r - 2.0).abs() < 1e-9);
        assert!((report.best.expectancy - 0.75).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_the_lowest_target() {
        let trades = vec![trade(Direction::Long, 100.0, 98.0, 98.0, None)];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let report = EdgeOptimizer::default().sweep(&refs).unwrap();
        assert!(report.curve.iter().all(|p| (p.expectancy + 1.0).abs() < 1e-9));
        assert!((report.best.target_r - 0.5).abs() < 1e-9);
    }

    #[test]
    fn all_zero_risk_trades_produce_a_flat_curve() {
        let trades = vec![trade(Direction::Long, 100.0, 104.0, 100.0, None)];
        let refs: Vec<&TradeRecord> = trades.iter().collect();
        let report = EdgeOptimizer::default().sweep(&refs).unwrap();
        assert_eq!(report.evaluated_trades, 0);
        assert_eq!(report.skipped_trades, 1);
        assert!(report.curve.iter().all(|p| p.expectancy == 0.0 && p.win_rate == 0.0));
    }
}
