//! Equipment ledger calculations
//!
//! Pure functions turning an equipment checklist into money. Nothing here
//! fails: amounts that are negative, NaN or infinite count as zero.

use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal, RoundingStrategy,
};

use crate::models::{
    boat::Boat,
    equipment::{Condition, EquipmentItem},
};

/// Clamp a user supplied amount to a finite, non-negative value
pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Share of the replacement price expected for an item that is already aboard
pub fn condition_coefficient(condition: Condition) -> f64 {
    match condition {
        Condition::Good => 0.0,
        Condition::NeedsService => 0.5,
        Condition::NeedsReplacement => 1.0,
        Condition::Unknown => 0.0,
    }
}

/// Expense represented by one checklist line.
///
/// A missing item is bought at full price; an existing one costs its price
/// weighted by the condition coefficient. The stored `expense` of the item is
/// ignored. Products too large for `f64` saturate at `f64::MAX`.
pub fn item_expense(item: &EquipmentItem) -> f64 {
    let quantity = sanitize_amount(item.quantity);
    let unit_price = sanitize_amount(item.unit_price);

    let expense = if item.exists {
        condition_coefficient(item.condition) * quantity * unit_price
    } else {
        quantity * unit_price
    };
    saturate(expense)
}

/// Sum of [`item_expense`] over a checklist.
///
/// The result does not depend on item order.
pub fn total_expense(items: &[EquipmentItem]) -> f64 {
    sum_amounts(items.iter().map(item_expense).collect())
}

/// Purchase price plus every equipment expense
pub fn projected_cost(boat: &Boat) -> f64 {
    sum_amounts(vec![
        sanitize_amount(boat.purchase_price),
        total_expense(&boat.equipment),
    ])
}

/// Round a monetary amount to cents, half away from zero.
///
/// Amounts beyond the decimal range have no meaningful cents and are
/// returned unchanged.
pub fn round_currency(value: f64) -> f64 {
    let value = sanitize_amount(value);
    Decimal::from_f64(value)
        .and_then(|amount| {
            amount
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                .to_f64()
        })
        .unwrap_or(value)
}

fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, f64::MAX)
    }
}

// Sums in decimal when every amount and partial sum fits, otherwise in f64 over
// the amounts sorted ascending. Either way the order of the input is irrelevant.
fn sum_amounts(mut amounts: Vec<f64>) -> f64 {
    let exact = amounts.iter().try_fold(Decimal::ZERO, |total, amount| {
        total.checked_add(Decimal::from_f64(*amount)?)
    });
    if let Some(total) = exact.and_then(|total| total.to_f64()) {
        return total;
    }

    amounts.sort_by(f64::total_cmp);
    saturate(amounts.iter().sum())
}
