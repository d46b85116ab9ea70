use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;
use std::sync::LazyLock;

static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d(?:[\d\s\u{a0},.]*\d)?").unwrap());

/// Rand amount held at two decimal places.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CURRENCY_SYMBOL: &'static str = "R";

    pub fn new(amount: Decimal) -> Self {
        Money(amount.round_dp(2))
    }

    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Reads the first amount out of retailer price text such as
    /// `"R 1 299,99"`, `"R1.299,99"`, `"R12.50 each"` or `"Now R8.99 Was R10.99"`.
    pub fn parse_display(text: &str) -> Option<Self> {
        let raw = AMOUNT_PATTERN.find(text)?.as_str();
        let compact: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .collect();

        // With both marks present the later one is the decimal point. A lone
        // comma is decimal only when one or two digits follow it.
        let decimal_mark = match (compact.rfind('.'), compact.rfind(',')) {
            (Some(dot), Some(comma)) => Some(if dot > comma { '.' } else { ',' }),
            (None, Some(comma)) => {
                let fraction_digits = compact.len() - comma - 1;
                (compact.matches(',').count() == 1 && (1..=2).contains(&fraction_digits))
                    .then_some(',')
            }
            (Some(_), None) => (compact.matches('.').count() == 1).then_some('.'),
            (None, None) => None,
        };

        let normalized: String = compact
            .chars()
            .filter_map(|c| match c {
                _ if Some(c) == decimal_mark => Some('.'),
                '.' | ',' => None,
                digit => Some(digit),
            })
            .collect();

        Decimal::from_str(&normalized).ok().map(Money::new)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut amount = self.0.round_dp(2);
        amount.rescale(2);
        write!(f, "{}{}", Self::CURRENCY_SYMBOL, amount)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}
