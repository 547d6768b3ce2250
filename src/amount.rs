use std::fmt;

use thiserror::Error;

/// Error parsing a currency-tagged amount string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("empty amount string")]
    Empty,

    #[error("invalid numeral {0:?}")]
    Invalid(String),

    #[error("amount {0:?} out of range")]
    OutOfRange(String),
}

/// Fixed-point decimal with 4 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(i64);

impl Amount {
    const SCALE: i64 = 10_000;
    const FRAC_DIGITS: usize = 4;

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    /// Whole currency units, e.g. `from_units(5_000)` is 5000.0000.
    pub const fn from_units(units: i64) -> Self {
        Amount(units * Self::SCALE)
    }

    /// Parse a currency-tagged string like `$1234.56`: a single prefix
    /// character (the currency tag, never inspected) followed by a decimal
    /// numeral with at most 4 fractional digits.
    pub fn parse_prefixed(s: &str) -> Result<Self, ParseAmountError> {
        let mut chars = s.chars();
        if chars.next().is_none() {
            return Err(ParseAmountError::Empty);
        }
        Self::parse_numeral(chars.as_str())
    }

    fn parse_numeral(s: &str) -> Result<Self, ParseAmountError> {
        let invalid = || ParseAmountError::Invalid(s.to_string());
        let out_of_range = || ParseAmountError::OutOfRange(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > Self::FRAC_DIGITS || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| out_of_range())?
        };
        let frac_scaled: i64 = if frac.is_empty() {
            0
        } else {
            // "5" means .5000, so pad to 4 digits before scaling
            let parsed: i64 = frac.parse().map_err(|_| invalid())?;
            parsed * 10_i64.pow((Self::FRAC_DIGITS - frac.len()) as u32)
        };

        units
            .checked_mul(Self::SCALE)
            .and_then(|scaled| scaled.checked_add(frac_scaled))
            .map(Amount)
            .ok_or_else(out_of_range)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        let whole = abs / Self::SCALE;
        let frac = abs % Self::SCALE;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl std::ops::Add for Amount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Amount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}
