//! Currency rounding helpers.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to cents, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a ratio or percentage to one decimal place
pub fn round_ratio(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or `None` when the denominator is zero
pub fn checked_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Format as Brazilian reais, e.g. `R$ 1.234,56`
pub fn format_brl(value: Decimal) -> String {
    let rounded = round_money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (integer, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    format!("{}R$ {},{}", if negative { "-" } else { "" }, grouped, cents)
}
