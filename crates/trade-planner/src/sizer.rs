use crate::error::PlanError;
use crate::models::{RiskMode, TradeInput};

/// Epsilon absorbed into step rounding so binary-float quotients like
/// 2.9999999996 still count as 3 steps
const STEP_EPSILON: f64 = 1e-9;

/// Sizing breakdown consumed by the planner when assembling the result
#[derive(Debug, Clone, PartialEq)]
pub struct Sizing {
    pub quantity: f64,
    pub below_min_lot: bool,
    /// Risk per unit: stop value plus fee
    pub unit_cost: f64,
    pub est_fees: f64,
    pub notional: f64,
    pub used_risk_cash: f64,
    /// Notional actually taken; set only in notional mode
    pub used_notional: Option<f64>,
}

/// Clamp to 8 decimal places so step-rounded quantities stay stable
/// across platforms
fn round8(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

/// Round a quantity down to the nearest multiple of `step`
pub fn round_down_to_step(quantity: f64, step: f64) -> f64 {
    round8((quantity / step + STEP_EPSILON).floor() * step)
}

/// Round a quantity up to the nearest multiple of `step`
pub fn round_up_to_step(quantity: f64, step: f64) -> f64 {
    round8((quantity / step - STEP_EPSILON).ceil() * step)
}

/// Convert the risk budget into a tradable quantity honoring lot
/// constraints, then derive fee, notional, and used-risk figures.
///
/// `stop` is the already-validated stop distance in price points.
pub fn size_position(input: &TradeInput, stop: f64) -> Result<Sizing, PlanError> {
    let instrument = &input.instrument;

    let stop_value_per_unit = stop * instrument.contract_multiplier;
    let unit_cost = stop_value_per_unit + instrument.fee_per_unit;
    if !unit_cost.is_finite() || unit_cost <= 0.0 {
        return Err(PlanError::Calculation(
            "unit cost must be positive and finite".to_string(),
        ));
    }

    let (raw_quantity, notional_mode) = match input.risk {
        RiskMode::RiskCash { risk_cash } => ((risk_cash / unit_cost).floor(), false),
        RiskMode::RiskPercent {
            account_size,
            risk_percent,
        } => {
            let risk_cash = account_size * risk_percent / 100.0;
            ((risk_cash / unit_cost).floor(), false)
        }
        RiskMode::Notional { notional } => {
            let denom = input.level * instrument.contract_multiplier;
            let quantity = if denom > 0.0 {
                (notional / denom).floor()
            } else {
                0.0
            };
            (quantity, true)
        }
    };
    let raw_quantity = raw_quantity.max(0.0);

    let step = if instrument.lot_step > 0.0 {
        instrument.lot_step
    } else {
        1.0
    };
    let rounded = round_down_to_step(raw_quantity, step);

    // The effective floor is the minimum lot itself when it already sits on
    // the step grid, otherwise the next step above it
    let min_lot_threshold = if instrument.min_lot > 0.0 {
        round_up_to_step(instrument.min_lot, step).max(instrument.min_lot)
    } else {
        0.0
    };

    let quantity = if min_lot_threshold > 0.0 {
        rounded.max(min_lot_threshold)
    } else {
        rounded
    };
    let below_min_lot = min_lot_threshold > 0.0 && rounded < min_lot_threshold && quantity > 0.0;

    let notional = quantity * input.level * instrument.contract_multiplier;

    Ok(Sizing {
        quantity,
        below_min_lot,
        unit_cost,
        est_fees: quantity * instrument.fee_per_unit,
        notional,
        used_risk_cash: quantity * unit_cost,
        used_notional: notional_mode.then_some(notional),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn round_down_exact_multiple_stays_put() {
        assert_relative_eq!(round_down_to_step(200.0, 1.0), 200.0);
        assert_relative_eq!(round_down_to_step(0.5, 0.1), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn round_down_absorbs_float_error() {
        // 0.3 / 0.1 = 2.9999999999999996 in binary floats
        assert_relative_eq!(round_down_to_step(0.3, 0.1), 0.3, epsilon = 1e-12);
        assert_relative_eq!(round_down_to_step(0.29, 0.1), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn round_up_absorbs_float_error() {
        assert_relative_eq!(round_up_to_step(0.3, 0.1), 0.3, epsilon = 1e-12);
        assert_relative_eq!(round_up_to_step(0.21, 0.1), 0.3, epsilon = 1e-12);
        assert_relative_eq!(round_up_to_step(25.0, 1.0), 25.0);
    }

    #[test]
    fn rounded_quantity_clamps_to_eight_decimals() {
        let rounded = round_down_to_step(1.0 / 3.0, 1e-8);
        assert_relative_eq!(rounded, 0.33333333, epsilon = 1e-15);
    }
}
