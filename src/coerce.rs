//! Fallback-to-zero numeric reading of cell content.

use crate::cell::CellValue;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    // Leading sign, digits with optional group separators, optional fraction,
    // trailing sign. At most one of the two signs may be present.
    static ref DECIMAL_REGEX: Regex =
        Regex::new(r"^([+-]?)(\d[\d,]*)?(?:\.(\d*))?([+-]?)$").unwrap();
}

/// Reads a cell as a decimal. Numbers pass through; text is parsed with
/// invariant rules; anything unparsable or empty is zero.
pub fn coerce_decimal(value: &CellValue) -> Decimal {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Text(s) => parse_invariant(s).unwrap_or(Decimal::ZERO),
        CellValue::Empty => Decimal::ZERO,
    }
}

/// Invariant-culture decimal parse: `1,234.50`, `-3`, `3-`, `.5`, `7.` are accepted;
/// exponents, currency symbols and stray characters are not.
pub fn parse_invariant(s: &str) -> Option<Decimal> {
    let caps = DECIMAL_REGEX.captures(s.trim())?;
    let (lead, trail) = (&caps[1], &caps[4]);
    if !lead.is_empty() && !trail.is_empty() {
        return None;
    }
    let sign = if lead.is_empty() { trail } else { lead };
    let int_part = caps.get(2).map_or(String::new(), |m| m.as_str().replace(',', ""));
    let frac_part = caps.get(3).map_or("", |m| m.as_str());

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let int_part = if int_part.is_empty() { "0" } else { int_part.as_str() };
    let normalized = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };

    Decimal::from_str(&normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn text(s: &str) -> CellValue {
        CellValue::text(s)
    }

    #[test]
    fn numbers_pass_through() {
        assert_eq!(coerce_decimal(&CellValue::Number(dec!(42.125))), dec!(42.125));
    }

    #[test]
    fn numeric_text_is_parsed() {
        assert_eq!(coerce_decimal(&text("12.5")), dec!(12.5));
        assert_eq!(coerce_decimal(&text("  -3 ")), dec!(-3));
        assert_eq!(coerce_decimal(&text("+7")), dec!(7));
        assert_eq!(coerce_decimal(&text("1,234.50")), dec!(1234.5));
        assert_eq!(coerce_decimal(&text(".5")), dec!(0.5));
        assert_eq!(coerce_decimal(&text("7.")), dec!(7));
        assert_eq!(coerce_decimal(&text("5-")), dec!(-5));
        assert_eq!(coerce_decimal(&text("1,250.5+")), dec!(1250.5));
    }

    #[test]
    fn everything_else_is_zero() {
        assert_eq!(coerce_decimal(&CellValue::Empty), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("abc")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("12abc")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("$12")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("1e3")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("1_000")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("-")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text(".")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text(",5")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("1.2.3")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("-5-")), Decimal::ZERO);
        assert_eq!(coerce_decimal(&text("+")), Decimal::ZERO);
    }

    #[test]
    fn overflow_is_zero() {
        let huge = "9".repeat(40);
        assert_eq!(coerce_decimal(&text(&huge)), Decimal::ZERO);
    }
}
