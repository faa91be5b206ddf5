//! Currency display formatting (en-US conventions).

use rust_decimal::{Decimal, RoundingStrategy};

/// Display convention for one currency code.
struct CurrencyStyle {
    symbol: &'static str,
    decimals: u32,
}

fn style_for(code: &str) -> Option<CurrencyStyle> {
    let (symbol, decimals) = match code {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "NZD" => ("NZ$", 2),
        "AUD" => ("A$", 2),
        "CAD" => ("CA$", 2),
        "JPY" => ("¥", 0),
        "INR" => ("₹", 2),
        _ => return None,
    };
    Some(CurrencyStyle { symbol, decimals })
}

/// Render `amount` in `code` the way an en-US locale would,
/// e.g. `$1,234.50`, `-€3.00`, `¥1,235`.
///
/// Unknown codes fall back to `CODE 1,234.50`.
pub fn format_currency(amount: Decimal, code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();
    let (prefix, decimals) = match style_for(&code) {
        Some(style) => (style.symbol.to_string(), style.decimals),
        None => (format!("{code} "), 2),
    };

    let rounded = amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let digits = format!("{:.*}", decimals as usize, rounded.abs());
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = format!("{sign}{prefix}{}", group_thousands(whole));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(whole: &str) -> String {
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Decimal::new(123450, 2), "USD", "$1,234.50")]
    #[case(Decimal::new(5, 0), "USD", "$5.00")]
    #[case(Decimal::new(0, 0), "USD", "$0.00")]
    #[case(Decimal::new(1234567891, 2), "USD", "$12,345,678.91")]
    #[case(Decimal::new(300, 2), "EUR", "€3.00")]
    #[case(Decimal::new(99, 1), "gbp", "£9.90")]
    #[case(Decimal::new(100000, 2), "NZD", "NZ$1,000.00")]
    #[case(Decimal::new(12345, 1), "JPY", "¥1,235")]
    #[case(Decimal::new(1050, 2), "CHF", "CHF 10.50")]
    fn test_format_currency(#[case] amount: Decimal, #[case] code: &str, #[case] expected: &str) {
        assert_eq!(format_currency(amount, code), expected);
    }

    #[test]
    fn test_negative_amount_sign_before_symbol() {
        assert_eq!(format_currency(Decimal::new(-250, 2), "USD"), "-$2.50");
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(format_currency(Decimal::new(1005, 3), "USD"), "$1.01");
    }

    #[test]
    fn test_negative_zero_after_rounding_has_no_sign() {
        assert_eq!(format_currency(Decimal::new(-1, 3), "USD"), "$0.00");
    }
}
