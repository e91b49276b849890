use crate::LedgerError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Number of base units in one coin.
pub const COIN: i64 = 100_000_000;
const DECIMALS: usize = 8;

/// A fixed-point amount with 8 decimal places, stored as a number of base units.
/// The amount is signed so that negative output values can be represented and then rejected
/// by validation.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default)]
pub struct Coin(i64);

impl Coin {
    pub const fn new(base_units: i64) -> Self {
        Coin(base_units)
    }

    pub const fn zero() -> Self {
        Self::new(0)
    }

    pub fn base_units(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl From<i64> for Coin {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

/// Parses decimal amounts such as `1.6`, `-0.5` or `42`.
impl FromStr for Coin {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LedgerError::InvalidAmount(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits, ""),
        };
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty())
            || !all_digits(whole)
            || !all_digits(fraction)
            || fraction.len() > DECIMALS
        {
            return Err(invalid());
        }

        let whole_units = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| invalid())?
        };
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            // Right-pad to 8 digits, e.g. "6" is 60000000 base units.
            format!("{:0<width$}", fraction, width = DECIMALS)
                .parse::<i64>()
                .map_err(|_| invalid())?
        };
        let units = whole_units
            .checked_mul(COIN)
            .and_then(|units| units.checked_add(fraction_units))
            .ok_or_else(invalid)?;
        Ok(Coin::new(if negative { -units } else { units }))
    }
}

/// Displays the amount in coins, without trailing zeros, e.g. `1.6`.
impl Display for Coin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / COIN as u64;
        let fraction = abs % COIN as u64;
        if fraction == 0 {
            write!(f, "{}{}", sign, whole)
        } else {
            let fraction = format!("{:0width$}", fraction, width = DECIMALS);
            write!(f, "{}{}.{}", sign, whole, fraction.trim_end_matches('0'))
        }
    }
}
