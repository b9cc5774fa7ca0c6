use serde::{Deserialize, Serialize};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }
}

/// Setup tag carried through to the result; does not affect any formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setup {
    Breakout,
    FalseBreakout,
}

impl Setup {
    /// Human-readable label for result rendering
    pub fn label(&self) -> &'static str {
        match self {
            Setup::Breakout => "Breakout",
            Setup::FalseBreakout => "False breakout",
        }
    }
}

/// Stop sizing method, exactly one per input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StopMethod {
    /// Stop distance as a percentage of the reference level
    FixedPercent {
        #[serde(default = "default_stop_percent")]
        percent: f64,
    },
    /// Stop distance as a multiple of ATR
    AtrMultiple {
        #[serde(default = "default_atr_multiple")]
        atr_multiple: f64,
    },
    /// Stop distance in absolute price points
    FixedPoints {
        #[serde(default)]
        points: f64,
    },
}

fn default_stop_percent() -> f64 { 0.3 }
fn default_atr_multiple() -> f64 { 0.5 }

impl StopMethod {
    pub fn label(&self) -> &'static str {
        match self {
            StopMethod::FixedPercent { .. } => "Fixed %",
            StopMethod::AtrMultiple { .. } => "ATR multiple",
            StopMethod::FixedPoints { .. } => "Fixed points",
        }
    }
}

/// Risk budget mode, exactly one per input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RiskMode {
    /// Fixed cash amount at risk
    RiskCash {
        #[serde(default)]
        risk_cash: f64,
    },
    /// Percentage of account size at risk
    RiskPercent { account_size: f64, risk_percent: f64 },
    /// Target notional exposure (quantity * level * contract multiplier)
    Notional { notional: f64 },
}

/// Instrument constraints applied during sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub contract_multiplier: f64,
    /// Quantity granularity; non-positive values fall back to 1
    pub lot_step: f64,
    /// Minimum tradable quantity; 0 disables the floor
    pub min_lot: f64,
    #[serde(default)]
    pub fee_per_unit: f64,
    /// Informational only, not used in any calculation
    #[serde(default)]
    pub price_tick: Option<f64>,
}

/// Immutable snapshot of one trade idea; one calculation per snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    pub direction: Direction,
    pub setup: Setup,
    /// Reference price the entry trigger is built from
    pub level: f64,
    /// Average true range, the volatility unit for stops and filters
    pub atr: f64,
    /// Reward-to-risk target; take-profit sits this many stops past the trigger
    pub rr_multiple: f64,
    pub stop: StopMethod,
    /// Fraction of the stop distance added to the level as an entry buffer
    #[serde(default)]
    pub buffer_ratio: f64,
    /// Alternative volatility measure for a secondary diagnostic; None when unknown
    #[serde(default)]
    pub range_passed: Option<f64>,
    /// Live reference price for the informational offset to the trigger
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Gates the 20%-of-ATR stop sanity check
    #[serde(default = "default_true")]
    pub enable_atr_filter: bool,
    pub instrument: Instrument,
    pub risk: RiskMode,
}

fn default_true() -> bool { true }

/// Cash-level projections for the sized position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    /// Cash actually at risk after lot rounding (quantity * unit cost)
    pub risk_cash: f64,
    pub est_fees: f64,
    pub pnl_at_tp: f64,
    pub pnl_at_sl: f64,
}

/// Fully derived trade plan; constructed once per call, never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub direction: Direction,
    pub setup: Setup,
    /// Stop distance in price points
    pub stop: f64,
    /// Extra distance added to the level to form the entry trigger
    pub buffer: f64,
    /// Entry trigger price (level adjusted by buffer)
    pub tvx: f64,
    pub sl_price: f64,
    pub tp_price: f64,
    pub atr_over_stop: f64,
    /// None when `range_passed` was not supplied
    pub range_over_stop: Option<f64>,
    /// Both volatility ratios clear the 4x threshold (unknown range passes)
    pub has_four_stops: bool,
    pub stop_within_atr_filter: bool,
    pub stop_atr_percent: f64,
    /// Offset from the live price to the trigger; None without `current_price`
    pub current_price_to_tvx: Option<f64>,
    pub quantity: f64,
    /// Sizing was forced up to meet the instrument minimum lot
    pub below_min_lot: bool,
    pub est_fees: f64,
    pub notional: f64,
    /// Failing sanity checks, in a fixed documented order
    pub warnings: Vec<String>,
    pub summary: PositionSummary,
}

/// Sizing metadata reported alongside the result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub used_risk_cash: f64,
    /// Populated only when sizing ran in notional mode
    #[serde(default)]
    pub used_notional: Option<f64>,
}

/// Return value of [`calculate`](crate::calculate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradePlan {
    pub result: TradeResult,
    pub meta: PlanMetadata,
}
