use std::cmp::Ordering;
use std::f64::consts::LN_2;
use std::fmt;
use std::iter::Product;
use std::ops::{Add, AddAssign, Mul, MulAssign};

const EXP_MASK: u64 = 0x7ff << 52;
// Largest exponent gap that still changes the sum of two mantissas
const MAX_ALIGN: i64 = 64;

/// A float with an f64 mantissa and an `i64` binary exponent.
///
/// Products of hundreds of sub-unity densities stay representable instead of
/// flushing to zero. Values are kept normalized so the mantissa magnitude is
/// in [0.5, 1), or the mantissa is exactly zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExtF64 {
    mantissa: f64,
    exponent: i64,
}

impl ExtF64 {
    pub const ZERO: ExtF64 = ExtF64 {
        mantissa: 0.0,
        exponent: 0,
    };

    pub const ONE: ExtF64 = ExtF64 {
        mantissa: 0.5,
        exponent: 1,
    };

    fn normalized(mantissa: f64, exponent: i64) -> Self {
        if mantissa == 0.0 || !mantissa.is_finite() {
            return ExtF64 {
                mantissa,
                exponent: 0,
            };
        }

        let bits = mantissa.to_bits();
        let raw_exp = ((bits & EXP_MASK) >> 52) as i64;
        if raw_exp == 0 {
            // subnormal: scale into the normal range first
            return Self::normalized(mantissa * 2_f64.powi(64), exponent - 64);
        }

        let mantissa = f64::from_bits((bits & !EXP_MASK) | (1022_u64 << 52));
        ExtF64 {
            mantissa,
            exponent: exponent + raw_exp - 1022,
        }
    }

    #[inline]
    pub fn from_f64(x: f64) -> Self {
        Self::normalized(x, 0)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    #[inline]
    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    #[inline]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// Natural log. `-inf` for zero and NaN for negative values.
    pub fn ln(&self) -> f64 {
        (self.exponent as f64).mul_add(LN_2, self.mantissa.ln())
    }

    /// Convert back to a plain f64, saturating to zero on underflow and to
    /// infinity on overflow.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() || !self.mantissa.is_finite() {
            self.mantissa
        } else if self.exponent > 1025 {
            self.mantissa.signum() * f64::INFINITY
        } else if self.exponent < -1100 {
            0.0
        } else {
            // two steps to avoid overflowing powi on the way to a subnormal
            let e1 = (self.exponent / 2) as i32;
            let e2 = self.exponent as i32 - e1;
            self.mantissa * 2_f64.powi(e1) * 2_f64.powi(e2)
        }
    }
}

impl Default for ExtF64 {
    fn default() -> Self {
        ExtF64::ZERO
    }
}

impl From<f64> for ExtF64 {
    fn from(x: f64) -> Self {
        ExtF64::from_f64(x)
    }
}

impl fmt::Display for ExtF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*2^{}", self.mantissa, self.exponent)
    }
}

impl Mul for ExtF64 {
    type Output = ExtF64;

    #[inline]
    fn mul(self, rhs: ExtF64) -> ExtF64 {
        ExtF64::normalized(
            self.mantissa * rhs.mantissa,
            self.exponent + rhs.exponent,
        )
    }
}

impl Mul<f64> for ExtF64 {
    type Output = ExtF64;

    #[inline]
    fn mul(self, rhs: f64) -> ExtF64 {
        self * ExtF64::from_f64(rhs)
    }
}

impl MulAssign for ExtF64 {
    #[inline]
    fn mul_assign(&mut self, rhs: ExtF64) {
        *self = *self * rhs;
    }
}

impl MulAssign<f64> for ExtF64 {
    #[inline]
    fn mul_assign(&mut self, rhs: f64) {
        *self = *self * rhs;
    }
}

impl Add for ExtF64 {
    type Output = ExtF64;

    fn add(self, rhs: ExtF64) -> ExtF64 {
        if self.is_zero() {
            return rhs;
        } else if rhs.is_zero() {
            return self;
        }

        let (big, small) = if self.exponent >= rhs.exponent {
            (self, rhs)
        } else {
            (rhs, self)
        };

        let gap = big.exponent - small.exponent;
        if gap > MAX_ALIGN {
            big
        } else {
            ExtF64::normalized(
                small.mantissa.mul_add(2_f64.powi(-(gap as i32)), big.mantissa),
                big.exponent,
            )
        }
    }
}

impl AddAssign for ExtF64 {
    #[inline]
    fn add_assign(&mut self, rhs: ExtF64) {
        *self = *self + rhs;
    }
}

impl Product for ExtF64 {
    fn product<I: Iterator<Item = ExtF64>>(iter: I) -> Self {
        iter.fold(ExtF64::ONE, |acc, x| acc * x)
    }
}

impl PartialOrd for ExtF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.mantissa.is_nan() || other.mantissa.is_nan() {
            return None;
        }

        let sign = |x: &ExtF64| {
            if x.mantissa > 0.0 {
                1
            } else if x.mantissa < 0.0 {
                -1
            } else {
                0
            }
        };

        match sign(self).cmp(&sign(other)) {
            Ordering::Equal => {}
            ord => return Some(ord),
        }

        let magnitude = self
            .exponent
            .cmp(&other.exponent)
            .then(self.mantissa.abs().total_cmp(&other.mantissa.abs()));

        if self.mantissa < 0.0 {
            Some(magnitude.reverse())
        } else {
            Some(magnitude)
        }
    }
}
