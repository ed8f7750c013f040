//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Cart lines summed as floats:                                           │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Change check with floats needs a fudge factor:                         │
//! │    abs(change - (paid - total)) > 0.01 ?                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Client sends "20.00" ──► parse_decimal ──► 2000 cents                │
//! │    Every sum, comparison and tolerance check is exact                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Money travels as a two-decimal string (`"20.00"`). Incoming JSON may use a
//! string or a plain number; both are parsed without going through `f64`
//! arithmetic, rounding half-up to the cent.
//!
//! ## Usage
//! ```rust
//! use pos_core::money::Money;
//!
//! let price = Money::from_cents(1099);
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.to_string(), "21.98");
//! assert_eq!(line.format_with_symbol("GHS"), "GHS21.98");
//! ```

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;
use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences such as `change - expected` can go negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Stored as INTEGER**: the `sqlx` feature makes it a transparent column type
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  products.price_cents ──► CartLineItem.unit_price ──► .subtotal         │
/// │                                                          │              │
/// │                                     Σ subtotal ──► CartSnapshot.total   │
/// │                                                          │              │
/// │  amount_paid / change_given ──► checkout preconditions ◄─┘              │
/// │                                                                         │
/// │  sales.amount_cents ──► Receipt Projection (tax, subtotal, total)      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal amount such as `"20"`, `"20.5"` or `"19.995"`.
    ///
    /// ## Rules
    /// - Optional leading sign, digits, optional `.` and fraction digits
    /// - Fractions beyond two digits round half-up on the third digit
    /// - No exponents, no thousands separators, no currency symbols
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("15").unwrap().cents(), 1500);
    /// assert_eq!(Money::parse_decimal("0.1").unwrap().cents(), 10);
    /// assert_eq!(Money::parse_decimal("2.345").unwrap().cents(), 235);
    /// assert!(Money::parse_decimal("12,50").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(invalid("must be a decimal number such as 12.50"));
        }

        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(|| invalid("is too large"))?
        };

        let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = whole_cents
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates the tax portion for a rate, rounding half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::Money;
    /// use pos_core::types::TaxRate;
    ///
    /// let line = Money::from_cents(2000);     // 20.00
    /// let nhil = TaxRate::from_bps(250);      // 2.5%
    /// assert_eq!(line.calculate_tax(nhil).cents(), 50);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large receipts cannot overflow the intermediate product
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use pos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Formats the amount with a currency symbol prefix, e.g. `GHS12.50`.
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{}{}.{:02}",
            sign,
            symbol,
            self.major().abs(),
            self.cents_part()
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain two-decimal rendering (`12.50`, `-5.50`). Used on the wire.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Accepts `"12.50"`, `12.5` or `12` from JSON.
struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Money, E> {
        Money::parse_decimal(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Money, E> {
        value
            .checked_mul(100)
            .map(Money::from_cents)
            .ok_or_else(|| E::custom("amount is too large"))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Money, E> {
        let value = i64::try_from(value).map_err(|_| E::custom("amount is too large"))?;
        self.visit_i64(value)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Money, E> {
        if !value.is_finite() {
            return Err(E::custom("amount must be a finite number"));
        }
        // Shortest round-trip text of the float, then exact decimal parsing
        Money::parse_decimal(&value.to_string()).map_err(E::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_cents(1234).format_with_symbol("GHS"), "GHS12.34");
        assert_eq!(Money::from_cents(-1234).format_with_symbol("$"), "-$12.34");
        assert_eq!(Money::from_cents(123456789).format_with_symbol("$"), "$1234567.89");
    }

    #[test]
    fn test_parse_decimal_accepts_common_inputs() {
        assert_eq!(Money::parse_decimal("20.00").unwrap().cents(), 2000);
        assert_eq!(Money::parse_decimal("20").unwrap().cents(), 2000);
        assert_eq!(Money::parse_decimal(" 7.5 ").unwrap().cents(), 750);
        assert_eq!(Money::parse_decimal(".25").unwrap().cents(), 25);
        assert_eq!(Money::parse_decimal("3.").unwrap().cents(), 300);
        assert_eq!(Money::parse_decimal("-1.10").unwrap().cents(), -110);
        assert_eq!(Money::parse_decimal("+4.01").unwrap().cents(), 401);
    }

    #[test]
    fn test_parse_decimal_rounds_half_up() {
        assert_eq!(Money::parse_decimal("0.004").unwrap().cents(), 0);
        assert_eq!(Money::parse_decimal("0.005").unwrap().cents(), 1);
        assert_eq!(Money::parse_decimal("9.999").unwrap().cents(), 1000);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for input in ["", "   ", ".", "abc", "1,50", "1.2.3", "1e3", "GHS5", "--1"] {
            assert!(Money::parse_decimal(input).is_err(), "accepted {input:?}");
        }
        assert!(Money::parse_decimal("999999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_json_round_trip_uses_decimal_strings() {
        let json = serde_json::to_string(&Money::from_cents(2000)).unwrap();
        assert_eq!(json, "\"20.00\"");

        let from_string: Money = serde_json::from_str("\"15.00\"").unwrap();
        let from_float: Money = serde_json::from_str("10.5").unwrap();
        let from_int: Money = serde_json::from_str("3").unwrap();
        assert_eq!(from_string.cents(), 1500);
        assert_eq!(from_float.cents(), 1050);
        assert_eq!(from_int.cents(), 300);

        assert!(serde_json::from_str::<Money>("\"ten\"").is_err());
        assert!(serde_json::from_str::<Money>("true").is_err());
    }

    /// 0.1 + 0.2 as floats is not 0.3; parsed into cents it is.
    #[test]
    fn test_float_inputs_do_not_drift() {
        let a: Money = serde_json::from_str("0.1").unwrap();
        let b: Money = serde_json::from_str("0.2").unwrap();
        assert_eq!((a + b).cents(), 30);
    }
}
