//! Rate and unit conversion helpers.
//!
//! Pure and stateless. Rate units (`per_second`, `per_minute`, `per_hour`)
//! convert among each other through a per-second pivot; count units
//! (`items`, `machines`) pass through unchanged. Formatting helpers round
//! for display only and never feed back into planning math.

use crate::rational::{Rational, RationalError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The unit attached to a requested or displayed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountUnit {
    Items,
    PerSecond,
    PerMinute,
    PerHour,
    Machines,
}

impl AmountUnit {
    /// Whether this unit is a rate (convertible) rather than a plain count.
    pub fn is_rate(self) -> bool {
        matches!(
            self,
            AmountUnit::PerSecond | AmountUnit::PerMinute | AmountUnit::PerHour
        )
    }

    /// Display suffix, e.g. `"/min"`.
    pub fn suffix(self) -> &'static str {
        match self {
            AmountUnit::Items => "",
            AmountUnit::PerSecond => "/s",
            AmountUnit::PerMinute => "/min",
            AmountUnit::PerHour => "/h",
            AmountUnit::Machines => " machines",
        }
    }
}

impl fmt::Display for AmountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AmountUnit::Items => "items",
            AmountUnit::PerSecond => "per_second",
            AmountUnit::PerMinute => "per_minute",
            AmountUnit::PerHour => "per_hour",
            AmountUnit::Machines => "machines",
        };
        write!(f, "{name}")
    }
}

/// Seconds per minute/hour as exact fractions. The denominators are
/// nonzero constants, so the fallback branch is unreachable.
fn ratio(numer: i64, denom: i64) -> Rational {
    Rational::from_ratio(numer, denom).unwrap_or_else(|_| Rational::zero())
}

/// Convert a rate amount to the per-second pivot. Count units pass through.
pub fn convert_to_per_second(amount: &Rational, unit: AmountUnit) -> Rational {
    match unit {
        AmountUnit::PerSecond => amount.clone(),
        AmountUnit::PerMinute => amount * &ratio(1, 60),
        AmountUnit::PerHour => amount * &ratio(1, 3600),
        AmountUnit::Items | AmountUnit::Machines => amount.clone(),
    }
}

/// Convert a per-second rate into `unit`. Count units pass through.
pub fn convert_from_per_second(amount: &Rational, unit: AmountUnit) -> Rational {
    match unit {
        AmountUnit::PerSecond => amount.clone(),
        AmountUnit::PerMinute => amount * &Rational::from_integer(60),
        AmountUnit::PerHour => amount * &Rational::from_integer(3600),
        AmountUnit::Items | AmountUnit::Machines => amount.clone(),
    }
}

/// Convert between any two units. Rate-to-rate goes through the per-second
/// pivot; if either side is a count unit the amount passes through.
pub fn convert_units(amount: &Rational, from: AmountUnit, to: AmountUnit) -> Rational {
    if from == to || !from.is_rate() || !to.is_rate() {
        return amount.clone();
    }
    convert_from_per_second(&convert_to_per_second(amount, from), to)
}

/// Machines needed to sustain `target_rate` (per second) with a recipe that
/// takes `craft_time_secs` per craft and yields `per_craft_output` per craft.
///
/// Fails only when `per_craft_output` is zero.
pub fn calculate_machines(
    target_rate: &Rational,
    craft_time_secs: &Rational,
    per_craft_output: &Rational,
) -> Result<Rational, RationalError> {
    (target_rate * craft_time_secs).checked_div(per_craft_output)
}

/// Inverse of [`calculate_machines`]: the per-second rate produced by
/// `machines` machines. Fails only when `craft_time_secs` is zero.
pub fn calculate_production_rate(
    machines: &Rational,
    craft_time_secs: &Rational,
    per_craft_output: &Rational,
) -> Result<Rational, RationalError> {
    (machines * per_craft_output).checked_div(craft_time_secs)
}

/// Render an amount for display: up to three fractional digits with
/// trailing zeros trimmed, plus the unit suffix.
pub fn format_amount(amount: &Rational, unit: AmountUnit) -> String {
    let mut body = amount.to_fixed(3);
    if body.contains('.') {
        while body.ends_with('0') {
            body.pop();
        }
        if body.ends_with('.') {
            body.pop();
        }
    }
    format!("{body}{}", unit.suffix())
}
