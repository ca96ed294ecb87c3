//! Currency display and JSON number helpers for `Decimal` amounts.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::ser::Error as _;
use serde::Serializer;
use std::collections::BTreeMap;

/// Largest single amount (₹10^15) accepted from input. Sums of many such
/// amounts, and percentages of them, stay well inside `Decimal`'s range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2764472320, 232830, 0, false, 0);

/// True when `amount` is a whole number of paise
pub fn is_whole_paise(amount: Decimal) -> bool {
    amount.normalize().scale() <= 2
}

pub fn format_inr(amount: Decimal) -> String {
    format!("₹{:.2}", amount)
}

pub fn format_inr_signed(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-₹{:.2}", amount.abs())
    } else {
        format_inr(amount)
    }
}

pub fn format_percent(pct: Decimal) -> String {
    format!("{:.2}%", pct)
}

/// Serialize a decimal as a JSON number rather than a string.
pub fn serialize_decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let number = value
        .to_f64()
        .ok_or_else(|| S::Error::custom(format!("amount {value} is not representable")))?;
    serializer.serialize_f64(number)
}

/// Serialize an optional decimal as a JSON number (or null).
pub fn serialize_decimal_opt<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(v) => serialize_decimal(v, serializer),
        None => serializer.serialize_none(),
    }
}

/// Serialize a label -> amount map with JSON number values.
pub fn serialize_decimal_map<S>(
    map: &BTreeMap<String, Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let entries = map
        .iter()
        .map(|(label, amount)| {
            amount
                .to_f64()
                .map(|value| (label, value))
                .ok_or_else(|| S::Error::custom(format!("amount {amount} is not representable")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    serializer.collect_map(entries)
}
