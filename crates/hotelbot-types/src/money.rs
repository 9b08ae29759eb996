//! Fixed-point money with two decimal places.
//!
//! Prices and budgets are stored as integer cents so that no floating point
//! rounding ever reaches the database. The accepted range mirrors an
//! 8-digit decimal column with 2 decimal places: `0.00` to `999999.99`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Largest representable amount, in cents (`999999.99`).
pub const MAX_CENTS: i64 = 99_999_999;

/// A non-negative amount with exactly two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build from a cent count, rejecting negatives and overflow of 8 digits.
    pub fn from_cents(cents: i64) -> Result<Self, ValidationError> {
        if cents < 0 {
            return Err(ValidationError::new("amount", "must not be negative"));
        }
        if cents > MAX_CENTS {
            return Err(ValidationError::new(
                "amount",
                "must have at most 8 digits (max 999999.99)",
            ));
        }
        Ok(Self(cents))
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(ValidationError::new("amount", "must not be negative"));
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(ValidationError::new("amount", format!("'{s}' is not a number")));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::new("amount", format!("'{s}' is not a number")));
        }
        if frac.len() > 2 {
            return Err(ValidationError::new(
                "amount",
                "must have at most 2 decimal places",
            ));
        }
        // Six integer digits is the ceiling; checking length first avoids overflow.
        let whole = whole.trim_start_matches('0');
        if whole.len() > 6 {
            return Err(ValidationError::new(
                "amount",
                "must have at most 8 digits (max 999999.99)",
            ));
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().unwrap_or(0) };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse().unwrap_or(0),
        };

        Money::from_cents(whole * 100 + frac)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
