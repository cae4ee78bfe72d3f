//! # Shared Utility Functions
//!
//! Display formatting used by dashboard consumers.
//!
//! ```rust
//! use shared::utils::{format_change, format_price};
//!
//! assert_eq!(format_price(61234.5678), "61,234.57");
//! assert_eq!(format_change(-1.234), "-1.23%");
//! ```

/// Format a price with thousands separators and two decimals.
///
/// Sub-unit prices keep more precision so small-cap coins stay readable:
///
/// ```rust
/// use shared::utils::format_price;
///
/// assert_eq!(format_price(10000.0), "10,000.00");
/// assert_eq!(format_price(0.000123), "0.000123");
/// ```
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "-".to_string();
    }
    if price.abs() < 1.0 && price != 0.0 {
        return format!("{:.6}", price);
    }
    let fixed = format!("{:.2}", price.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

/// Format a coin amount with up to eight decimals and no trailing zeros
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }
    let fixed = format!("{:.8}", amount);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a percent change with an explicit sign
pub fn format_change(change: f64) -> String {
    if !change.is_finite() {
        return "-".to_string();
    }
    if change > 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(1234567.891), "1,234,567.89");
        assert_eq!(format_price(999.0), "999.00");
        assert_eq!(format_price(0.0), "0.00");
        assert_eq!(format_price(-1500.0), "-1,500.00");
    }

    #[test]
    fn test_format_price_handles_non_finite() {
        assert_eq!(format_price(f64::NAN), "-");
        assert_eq!(format_price(f64::INFINITY), "-");
    }

    #[test]
    fn test_format_amount_trims_zeros() {
        assert_eq!(format_amount(1.5), "1.5");
        assert_eq!(format_amount(2.0), "2");
        assert_eq!(format_amount(0.00000001), "0.00000001");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn test_format_change_sign() {
        assert_eq!(format_change(2.5), "+2.50%");
        assert_eq!(format_change(-0.5), "-0.50%");
        assert_eq!(format_change(0.0), "0.00%");
    }
}
