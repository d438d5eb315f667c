//! Integer-backed monetary amounts with a two-decimal target scale.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::AmountError;

// Widest fractional precision accepted on input. Keeps the cross-scale
// comparison below safely inside i128.
const MAX_SCALE: u32 = 9;

/// A decimal amount held as an integer mantissa plus a decimal scale.
///
/// Amounts compare numerically, so `1.5 == 1.50`. Balances and movement
/// amounts are always stored at scale 2; the wider input scale exists so
/// an over-precise amount can be carried to the point where the domain
/// rejects it, instead of being rounded at the door.
#[derive(Clone, Copy, Debug)]
pub struct Amount {
    mantissa: i64,
    scale: u32,
}

impl Amount {
    pub const ZERO: Amount = Amount {
        mantissa: 0,
        scale: 2,
    };

    /// The amount `mantissa * 10^-scale`.
    pub fn new(mantissa: i64, scale: u32) -> Result<Amount, AmountError> {
        if scale > MAX_SCALE {
            return Err(AmountError::Malformed);
        }
        Ok(Amount { mantissa, scale })
    }

    /// An exact count of minor units, already at scale 2.
    pub fn from_cents(cents: i64) -> Amount {
        Amount {
            mantissa: cents,
            scale: 2,
        }
    }

    /// Normalizes to exactly two fractional digits. Amounts carrying
    /// finer non-zero precision are rejected, never rounded.
    pub fn to_scale_two(self) -> Result<Amount, AmountError> {
        if self.scale <= 2 {
            let factor = 10_i64.pow(2 - self.scale);
            let mantissa = self
                .mantissa
                .checked_mul(factor)
                .ok_or(AmountError::Malformed)?;
            return Ok(Amount { mantissa, scale: 2 });
        }
        let factor = 10_i64.pow(self.scale - 2);
        if self.mantissa % factor != 0 {
            return Err(AmountError::PrecisionLoss);
        }
        Ok(Amount {
            mantissa: self.mantissa / factor,
            scale: 2,
        })
    }

    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    pub fn is_positive(&self) -> bool {
        self.mantissa > 0
    }

    /// `self - other`. Both operands must already be at scale 2, which
    /// holds for every stored balance and normalized charge amount.
    pub fn minus(self, other: Amount) -> Amount {
        debug_assert_eq!(self.scale, 2);
        debug_assert_eq!(other.scale, 2);
        Amount {
            mantissa: self.mantissa - other.mantissa,
            scale: 2,
        }
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Amount) -> Ordering {
        // Cross-multiplied compare; scales are capped so this fits i128.
        let lhs = i128::from(self.mantissa) * 10_i128.pow(other.scale);
        let rhs = i128::from(other.mantissa) * 10_i128.pow(self.scale);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Amount) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Amount) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Amount, AmountError> {
        let (units, frac) = match s.split_once('.') {
            Some((units, frac)) => (units, frac),
            None => (s, ""),
        };
        if frac.len() as u32 > MAX_SCALE {
            return Err(AmountError::Malformed);
        }
        // Digit validation is delegated to the integer parse below; a
        // stray sign or letter in either half fails it.
        let mut digits = String::with_capacity(units.len() + frac.len());
        digits.push_str(units);
        digits.push_str(frac);
        let mantissa: i64 = digits.parse().map_err(|_| AmountError::Malformed)?;
        Amount::new(mantissa, frac.len() as u32)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        let factor = 10_i64.pow(self.scale);
        let units = self.mantissa / factor;
        let frac = (self.mantissa % factor).abs();
        let sign = if self.mantissa < 0 && units == 0 { "-" } else { "" };
        write!(f, "{sign}{units}.{frac:0width$}", width = self.scale as usize)
    }
}
