/// Amounts are whole currency units. Every tier principal and weekly
/// increment is an exact integer, so no fractional part is tracked.
pub type Amount = i64;

/// Rates are expressed in basis points: 100 bp = 1%.
pub type BasisPoints = i64;

pub const BPS_SCALE: BasisPoints = 10_000;

/// Apply a basis-point rate to an amount, truncating toward zero.
/// Example: apply_rate(20000, 1000) -> 2000
pub fn apply_rate(amount: Amount, rate_bps: BasisPoints) -> Amount {
    amount * rate_bps / BPS_SCALE
}

/// Format a rate as a percentage string.
/// Example: 500 -> "5%", 1250 -> "12.5%"
pub fn format_rate(rate_bps: BasisPoints) -> String {
    let whole = rate_bps / 100;
    let fraction = (rate_bps % 100).abs();
    if fraction == 0 {
        format!("{}%", whole)
    } else if fraction % 10 == 0 {
        format!("{}.{}%", whole, fraction / 10)
    } else {
        format!("{}.{:02}%", whole, fraction)
    }
}

/// Format an amount with thousands separators.
/// Example: 30000 -> "30,000", -1234567 -> "-1,234,567"
pub fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}
