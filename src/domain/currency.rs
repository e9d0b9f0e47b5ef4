//! Copper amounts and their gold/silver/copper breakdown.

use std::fmt;

use thiserror::Error;

pub const COPPER_PER_SILVER: u64 = 100;
pub const COPPER_PER_GOLD: u64 = 10_000;

#[derive(Debug, Error, PartialEq)]
pub enum CurrencyError {
    #[error("negative price: {0}")]
    Negative(f64),
    #[error("price is not a finite number")]
    NotFinite,
}

/// A copper amount split into denominations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Money {
    pub gold: u64,
    pub silver: u64,
    pub copper: u64,
}

pub fn to_parts(copper: u64) -> Money {
    Money {
        gold: copper / COPPER_PER_GOLD,
        silver: (copper % COPPER_PER_GOLD) / COPPER_PER_SILVER,
        copper: copper % COPPER_PER_SILVER,
    }
}

impl Money {
    pub fn from_copper(copper: u64) -> Self {
        to_parts(copper)
    }

    /// Rounds a wire price (copper as a float) to the nearest copper.
    pub fn try_from_price(price: f64) -> Result<Self, CurrencyError> {
        if !price.is_finite() {
            return Err(CurrencyError::NotFinite);
        }
        if price < 0.0 {
            return Err(CurrencyError::Negative(price));
        }
        Ok(to_parts(price.round() as u64))
    }

    pub fn to_copper(&self) -> u64 {
        self.gold * COPPER_PER_GOLD + self.silver * COPPER_PER_SILVER + self.copper
    }

    pub fn shows_gold(&self) -> bool {
        self.gold > 0
    }

    pub fn shows_silver(&self) -> bool {
        self.silver > 0 || self.gold > 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shows_gold() {
            write!(f, "{}g ", group_thousands(self.gold))?;
        }
        if self.shows_silver() {
            write!(f, "{}s ", self.silver)?;
        }
        write!(f, "{}c", self.copper)
    }
}

/// Formats a wire price, falling back to a dash for invalid values.
pub fn format_price(price: f64) -> String {
    Money::try_from_price(price)
        .map(|money| money.to_string())
        .unwrap_or_else(|_| "-".to_string())
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
