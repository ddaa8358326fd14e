use crate::input_utils::{coerce_f64, optional_f64, quantity_or_default, tick_size_or_default};
use crate::instruments;
use crate::models::{DerivedFields, Direction, TradeEconomics, TradeInput, TradeRecord, TradeResult};
use log::debug;

/// Resolve raw form input into numbers. Tick economics missing from the input are taken
/// from the known-instrument table before falling back to the configured defaults.
pub fn resolve_economics(input: &TradeInput, default_tick_size: f64) -> TradeEconomics {
    let instrument = instruments::lookup(&input.symbol);

    let tick_size_fallback = instrument
        .map(|i| i.tick_size)
        .unwrap_or(default_tick_size);
    let tick_size = tick_size_or_default(input.tick_size.as_ref(), tick_size_fallback);

    let tick_value = match (&input.tick_value, instrument) {
        (None, Some(known)) => known.tick_value,
        (value, _) => coerce_f64("tickValue", value.as_ref()),
    };

    TradeEconomics {
        direction: input.direction,
        quantity: quantity_or_default(input.quantity.as_ref()),
        tick_value,
        tick_size,
        entry_price: coerce_f64("entryPrice", input.entry_price.as_ref()),
        exit_price: coerce_f64("exitPrice", input.exit_price.as_ref()),
        stop_loss: coerce_f64("stopLoss", input.stop_loss.as_ref()),
        take_profit: coerce_f64("takeProfit", input.take_profit.as_ref()),
        mfe_price: optional_f64("mfePrice", input.mfe_price.as_ref()),
        commission: coerce_f64("commission", input.commission.as_ref()),
    }
}

/// Signed price movement in the trade's favor.
pub fn favorable_diff(direction: Direction, entry: f64, price: f64) -> f64 {
    match direction {
        Direction::Long => price - entry,
        Direction::Short => entry - price,
    }
}

/// P&L, R-multiple and classification from resolved inputs.
///
/// R is measured in raw price distance while P&L goes through tick economics, so the
/// two only agree when tick value scales linearly with price.
pub fn compute_derived(economics: &TradeEconomics) -> DerivedFields {
    let price_diff = favorable_diff(
        economics.direction,
        economics.entry_price,
        economics.exit_price,
    );
    let pnl = (price_diff / economics.tick_size) * economics.tick_value * economics.quantity as f64
        - economics.commission;

    let risk_per_unit = (economics.entry_price - economics.stop_loss).abs();
    let reward_per_unit = price_diff.abs();

    let mut r_multiple = if risk_per_unit > 0.0 {
        reward_per_unit / risk_per_unit
    } else {
        0.0
    };
    if pnl < 0.0 && r_multiple != 0.0 {
        r_multiple = -r_multiple;
    }

    let max_favorable_move_points = economics.mfe_price.map(|mfe| {
        favorable_diff(economics.direction, economics.entry_price, mfe).max(0.0)
    });

    DerivedFields {
        pnl,
        r_multiple,
        result: TradeResult::from_pnl(pnl),
        risk_per_unit,
        reward_per_unit,
        max_favorable_move_points,
    }
}

impl TradeRecord {
    pub fn from_input(id: String, input: &TradeInput, default_tick_size: f64) -> Self {
        let economics = resolve_economics(input, default_tick_size);
        let derived = compute_derived(&economics);
        debug!(
            "Computed trade {} {} {}: pnl={:.2} r={:.2} result={}",
            id,
            input.symbol,
            economics.direction.as_str(),
            derived.pnl,
            derived.r_multiple,
            derived.result.as_str()
        );

        Self {
            id,
            date: input.date,
            time: input.time,
            symbol: input.symbol.trim().to_string(),
            economics,
            setup_id: input
                .setup_id
                .as_ref()
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            criteria: input.criteria.normalized(),
            screenshots: input.screenshots.clone(),
            notes: input.notes.clone(),
            derived,
        }
    }

    /// Full replacement from edited input; the id is kept and every derived field recomputed.
    pub fn replace_with(&mut self, input: &TradeInput, default_tick_size: f64) {
        let id = std::mem::take(&mut self.id);
        *self = Self::from_input(id, input, default_tick_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_utils::NumericInput;
    use crate::models::{BucketedCriteria, Screenshots};
    use chrono::{NaiveDate, NaiveTime};

    fn input(direction: Direction, entry: f64, exit: f64, stop: f64) -> TradeInput {
        TradeInput {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
            symbol: "TEST".to_string(),
            direction,
            quantity: Some(1.0.into()),
            tick_value: Some(1.0.into()),
            tick_size: Some(1.0.into()),
            entry_price: Some(entry.into()),
            exit_price: Some(exit.into()),
            stop_loss: Some(stop.into()),
            take_profit: None,
            mfe_price: None,
            commission: Some(0.0.into()),
            setup_id: None,
            criteria: BucketedCriteria::default(),
            screenshots: Screenshots::default(),
            notes: String::new(),
        }
    }

    fn derive(input: &TradeInput) -> DerivedFields {
        compute_derived(&resolve_economics(input, 0.25))
    }

    #[test]
    fn long_winner_scenario() {
        let derived = derive(&input(Direction::Long, 100.0, 105.0, 98.0));
        assert!((derived.pnl - 5.0).abs() < 1e-9);
        assert!((derived.risk_per_unit - 2.0).abs() < 1e-9);
        assert!((derived.reward_per_unit - 5.0).abs() < 1e-9);
        assert!((derived.r_multiple - 2.5).abs() < 1e-9);
        assert_eq!(derived.result, TradeResult::Win);
    }

    #[test]
    fn short_loser_scenario() {
        let derived = derive(&input(Direction::Short, 100.0, 103.0, 98.0));
        assert!((derived.pnl + 3.0).abs() < 1e-9);
        assert!((derived.risk_per_unit - 2.0).abs() < 1e-9);
        assert!((derived.r_multiple + 1.5).abs() < 1e-9);
        assert_eq!(derived.result, TradeResult::Loss);
    }

    #[test]
    fn commission_can_turn_a_winner_into_a_loss() {
        let mut trade = input(Direction::Long, 100.0, 101.0, 99.0);
        trade.commission = Some(2.5.into());
        let derived = derive(&trade);
        assert!((derived.pnl + 1.5).abs() < 1e-9);
        assert!((derived.r_multiple + 1.0).abs() < 1e-9);
        assert_eq!(derived.result, TradeResult::Loss);
    }

    #[test]
    fn tick_economics_scale_pnl_but_not_r() {
        let mut trade = input(Direction::Long, 5000.0, 5002.0, 4999.0);
        trade.tick_size = Some(0.25.into());
        trade.tick_value = Some(12.5.into());
        trade.quantity = Some(2.0.into());
        trade.commission = Some(4.0.into());
        let derived = derive(&trade);
        // 8 ticks * 12.5 * 2 contracts - 4
        assert!((derived.pnl - 196.0).abs() < 1e-9);
        assert!((derived.r_multiple - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_risk_gives_zero_r() {
        let derived = derive(&input(Direction::Long, 100.0, 104.0, 100.0));
        assert_eq!(derived.r_multiple, 0.0);
        assert_eq!(derived.result, TradeResult::Win);
    }

    #[test]
    fn flat_exit_with_commission_has_unsigned_zero_r() {
        let mut trade = input(Direction::Long, 100.0, 100.0, 98.0);
        trade.commission = Some(1.0.into());
        let derived = derive(&trade);
        assert_eq!(derived.result, TradeResult::Loss);
        assert_eq!(derived.r_multiple.to_bits(), 0.0_f64.to_bits());
    }

    #[test]
    fn garbage_numbers_are_coerced() {
        let mut trade = input(Direction::Long, 100.0, 105.0, 98.0);
        trade.stop_loss = Some(NumericInput::Text("9B".to_string()));
        trade.tick_size = Some(NumericInput::Text("".to_string()));
        trade.quantity = Some(NumericInput::Text("-2".to_string()));
        let economics = resolve_economics(&trade, 0.25);
        assert_eq!(economics.stop_loss, 0.0);
        assert_eq!(economics.tick_size, 0.25);
        assert_eq!(economics.quantity, 1);
        let derived = compute_derived(&economics);
        assert!((derived.pnl - 20.0).abs() < 1e-9);
        assert!((derived.risk_per_unit - 100.0).abs() < 1e-9);
    }

    #[test]
    fn known_instruments_fill_missing_tick_economics() {
        let mut trade = input(Direction::Short, 18000.0, 17990.0, 18010.0);
        trade.symbol = "NQZ4".to_string();
        trade.tick_size = None;
        trade.tick_value = None;
        let economics = resolve_economics(&trade, 1.0);
        assert_eq!(economics.tick_size, 0.25);
        assert_eq!(economics.tick_value, 5.0);
        let derived = compute_derived(&economics);
        assert!((derived.pnl - 200.0).abs() < 1e-9);
    }

    #[test]
    fn mfe_is_clamped_to_favorable_side() {
        let mut trade = input(Direction::Short, 100.0, 97.0, 102.0);
        trade.mfe_price = Some(95.5.into());
        assert_eq!(derive(&trade).max_favorable_move_points, Some(4.5));

        trade.mfe_price = Some(101.0.into());
        assert_eq!(derive(&trade).max_favorable_move_points, Some(0.0));

        trade.mfe_price = None;
        assert_eq!(derive(&trade).max_favorable_move_points, None);
    }

    #[test]
    fn recomputation_is_bit_identical() {
        let mut trade = input(Direction::Long, 4321.75, 4330.5, 4317.25);
        trade.tick_size = Some(0.25.into());
        trade.tick_value = Some(1.25.into());
        trade.commission = Some(1.04.into());
        let first = derive(&trade);
        let second = derive(&trade);
        assert_eq!(first.pnl.to_bits(), second.pnl.to_bits());
        assert_eq!(first.r_multiple.to_bits(), second.r_multiple.to_bits());
        assert_eq!(first, second);

        let record = TradeRecord::from_input("t1".to_string(), &trade, 0.25);
        let rebuilt = TradeRecord::from_input("t1".to_string(), &record.to_input(), 0.25);
        assert_eq!(record.derived(), rebuilt.derived());
    }

    #[test]
    fn replace_keeps_id_and_recomputes_everything() {
        let mut record =
            TradeRecord::from_input("keep-me".to_string(), &input(Direction::Long, 100.0, 105.0, 98.0), 0.25);
        record.replace_with(&input(Direction::Long, 100.0, 96.0, 98.0), 0.25);
        assert_eq!(record.id(), "keep-me");
        assert_eq!(record.result(), TradeResult::Loss);
        assert!((record.r_multiple() + 2.0).abs() < 1e-9);
    }

    #[test]
    fn sign_of_r_follows_pnl() {
        let cases = [
            (Direction::Long, 10.0, 12.0, 9.0),
            (Direction::Long, 10.0, 8.5, 9.0),
            (Direction::Short, 10.0, 7.0, 11.0),
            (Direction::Short, 10.0, 10.75, 11.0),
            (Direction::Long, 10.0, 10.0, 9.0),
        ];
        for (direction, entry, exit, stop) in cases {
            let derived = derive(&input(direction, entry, exit, stop));
            assert_eq!(derived.pnl > 0.0, derived.r_multiple > 0.0);
            assert_eq!(derived.pnl < 0.0, derived.r_multiple < 0.0);
            assert_eq!(derived.result, TradeResult::from_pnl(derived.pnl));
        }
    }
}
