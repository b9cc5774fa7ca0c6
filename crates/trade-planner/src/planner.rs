use tracing::debug;

use crate::error::PlanError;
use crate::models::*;
use crate::sizer;

/// Both volatility ratios (ATR/stop, range/stop) should cover at least
/// this many stops
pub const FOUR_STOP_THRESHOLD: f64 = 4.0;

/// The stop should not exceed this fraction of ATR when the filter is on
pub const ATR_FILTER_LIMIT: f64 = 0.2;

pub const WARN_ATR_OVER_STOP: &str = "ATR/Stop < 4";
pub const WARN_RANGE_OVER_STOP: &str = "Range/Stop < 4";
pub const WARN_STOP_ATR_FILTER: &str = "Stop exceeds 20% ATR limit";
pub const WARN_BELOW_MIN_LOT: &str = "Qty is below minimum lot";

/// Compute a full trade plan from one input snapshot.
///
/// Pure and deterministic: no state survives the call, so callers may fan
/// out concurrent invocations (one per setup/stop-method combination)
/// without synchronization. Fails with [`PlanError`] on out-of-domain base
/// input or derived state; warnings never abort the computation.
pub fn calculate(input: &TradeInput) -> Result<TradePlan, PlanError> {
    validate(input)?;

    let stop = stop_distance(input);
    if stop <= 0.0 {
        return Err(PlanError::Calculation(
            "computed stop must be positive".to_string(),
        ));
    }

    let buffer = stop * input.buffer_ratio;
    let (tvx, sl_price, tp_price) = match input.direction {
        Direction::Long => {
            let tvx = input.level + buffer;
            (tvx, input.level - stop, tvx + input.rr_multiple * stop)
        }
        Direction::Short => {
            let tvx = input.level - buffer;
            (tvx, input.level + stop, tvx - input.rr_multiple * stop)
        }
    };

    let atr_over_stop = input.atr / stop;
    let range_over_stop = input.range_passed.map(|range| range / stop);
    let has_four_stops = atr_over_stop >= FOUR_STOP_THRESHOLD
        && range_over_stop.map_or(true, |ratio| ratio >= FOUR_STOP_THRESHOLD);
    let stop_within_atr_filter = !input.enable_atr_filter || stop <= ATR_FILTER_LIMIT * input.atr;
    let stop_atr_percent = stop / input.atr * 100.0;
    let current_price_to_tvx = input.current_price.map(|price| price - tvx);

    let sizing = sizer::size_position(input, stop)?;

    let multiplier = input.instrument.contract_multiplier;
    let (tp_distance, sl_distance) = match input.direction {
        Direction::Long => (tp_price - tvx, tvx - sl_price),
        Direction::Short => (tvx - tp_price, sl_price - tvx),
    };
    let pnl_at_tp = tp_distance * sizing.quantity * multiplier;
    let pnl_at_sl = -sl_distance * sizing.quantity * multiplier;

    // Fixed order, relied on by snapshot tests and the result grid
    let mut warnings = Vec::new();
    if atr_over_stop < FOUR_STOP_THRESHOLD {
        warnings.push(WARN_ATR_OVER_STOP.to_string());
    }
    if matches!(range_over_stop, Some(ratio) if ratio < FOUR_STOP_THRESHOLD) {
        warnings.push(WARN_RANGE_OVER_STOP.to_string());
    }
    if !stop_within_atr_filter {
        warnings.push(WARN_STOP_ATR_FILTER.to_string());
    }
    if sizing.below_min_lot {
        warnings.push(WARN_BELOW_MIN_LOT.to_string());
    }

    debug!(
        symbol = %input.instrument.symbol,
        stop,
        tvx,
        quantity = sizing.quantity,
        warnings = warnings.len(),
        "trade plan computed"
    );

    let meta = PlanMetadata {
        used_risk_cash: sizing.used_risk_cash,
        used_notional: sizing.used_notional,
    };

    Ok(TradePlan {
        result: TradeResult {
            direction: input.direction,
            setup: input.setup,
            stop,
            buffer,
            tvx,
            sl_price,
            tp_price,
            atr_over_stop,
            range_over_stop,
            has_four_stops,
            stop_within_atr_filter,
            stop_atr_percent,
            current_price_to_tvx,
            quantity: sizing.quantity,
            below_min_lot: sizing.below_min_lot,
            est_fees: sizing.est_fees,
            notional: sizing.notional,
            warnings,
            summary: PositionSummary {
                risk_cash: sizing.used_risk_cash,
                est_fees: sizing.est_fees,
                pnl_at_tp,
                pnl_at_sl,
            },
        },
        meta,
    })
}

/// Reject structurally invalid base input before anything is derived
fn validate(input: &TradeInput) -> Result<(), PlanError> {
    if input.level <= 0.0 {
        return Err(PlanError::InvalidInput(
            "level must be greater than zero".to_string(),
        ));
    }
    if input.atr <= 0.0 {
        return Err(PlanError::InvalidInput(
            "atr must be greater than zero".to_string(),
        ));
    }
    if input.rr_multiple <= 0.0 {
        return Err(PlanError::InvalidInput(
            "rr multiple must be greater than zero".to_string(),
        ));
    }
    if input.buffer_ratio < 0.0 {
        return Err(PlanError::InvalidInput(
            "buffer ratio must not be negative".to_string(),
        ));
    }
    if input.instrument.contract_multiplier <= 0.0 {
        return Err(PlanError::InvalidInput(
            "contract multiplier must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn stop_distance(input: &TradeInput) -> f64 {
    match input.stop {
        StopMethod::FixedPercent { percent } => percent / 100.0 * input.level,
        StopMethod::AtrMultiple { atr_multiple } => atr_multiple * input.atr,
        StopMethod::FixedPoints { points } => points,
    }
}
