// Exact integer requantization
//
// Every positive finite f32 is an odd integer times a power of two:
//
//   s = mantissa * 2^exponent,   mantissa odd, < 2^24
//
// so the real value of an ADD/SUB output code before rounding,
//
//   x = (d1 * s1 + d2 * s2) / s_out
//     = (d1 * m1 * 2^u1 + d2 * m2 * 2^u2) / m_out,   u_i = e_i - e_out
//
// is a ratio of integers. The kernel evaluates it with integer shifts, adds
// and one division by the odd output mantissa, so rounding half away from
// zero is exact for every pair of scales.
//
// The numerator is formed at the exponent of its lower term. When the two
// terms are more than WIDE_SPREAD bits apart the lower one is folded in as
// a floor, which changes neither the rounded result nor any tie, because
// the divide below only looks at bits above the guard bit.

use qarith_core::{Error, Result};

/// Exponent gap above which the lower term is folded in as a floor.
const WIDE_SPREAD: i32 = 80;

/// Magnitudes at or above this saturate every storage type.
const SATURATED: i32 = 1 << 30;

/// A positive f32 scale as `mantissa * 2^exponent` with an odd mantissa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DyadicScale {
    pub mantissa: i64,
    pub exponent: i32,
}

impl DyadicScale {
    /// Exact decomposition of a positive finite scale.
    pub fn from_f32(scale: f32) -> Result<Self> {
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(Error::InvalidScale { scale });
        }
        let bits = scale.to_bits();
        let raw_exp = ((bits >> 23) & 0xff) as i32;
        let fraction = (bits & 0x7f_ffff) as i64;
        let (mantissa, exponent) = if raw_exp == 0 {
            (fraction, -149)
        } else {
            (fraction | 1 << 23, raw_exp - 150)
        };
        let tz = mantissa.trailing_zeros() as i32;
        Ok(Self {
            mantissa: mantissa >> tz,
            exponent: exponent + tz,
        })
    }
}

/// Integer-only evaluation of `round((d1 * s1 + d2 * s2) / s_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requantizer {
    /// Mantissa of the first input scale.
    pub coef1: i64,
    /// Mantissa of the second input scale, negative for SUB.
    pub coef2: i64,
    /// Input exponents relative to the output scale's.
    pub exp1: i32,
    pub exp2: i32,
    /// Mantissa of the output scale.
    pub divisor: i64,
}

impl Requantizer {
    pub fn new(in1: DyadicScale, in2: DyadicScale, out: DyadicScale, negate2: bool) -> Self {
        Self {
            coef1: in1.mantissa,
            coef2: if negate2 { -in2.mantissa } else { in2.mantissa },
            exp1: in1.exponent - out.exponent,
            exp2: in2.exponent - out.exponent,
            divisor: out.mantissa,
        }
    }

    /// Output code offset for the zero-point-relative inputs `d1`, `d2`,
    /// rounded half away from zero. Magnitudes past any storage range come
    /// back as ±2^30.
    #[inline]
    pub fn apply(&self, d1: i32, d2: i32) -> i32 {
        let (negative, magnitude, exponent) = exact_sum(
            (d1 as i64 * self.coef1, self.exp1),
            (d2 as i64 * self.coef2, self.exp2),
        );
        let q = rounded_quotient(magnitude, exponent, self.divisor);
        if negative {
            -q
        } else {
            q
        }
    }
}

/// `|n1 * 2^u1 + n2 * 2^u2|` as `k * 2^e` plus a remainder below `2^e`,
/// with the sign. The remainder is nonzero only when the terms are more
/// than WIDE_SPREAD bits apart, and then `e` sits WIDE_SPREAD bits below
/// the upper term.
fn exact_sum((n1, u1): (i64, i32), (n2, u2): (i64, i32)) -> (bool, u128, i32) {
    let ((hi, hi_exp), (lo, lo_exp)) = if u1 >= u2 {
        ((n1, u1), (n2, u2))
    } else {
        ((n2, u2), (n1, u1))
    };
    if hi == 0 {
        return (lo < 0, lo.unsigned_abs() as u128, lo_exp);
    }
    if lo == 0 {
        return (hi < 0, hi.unsigned_abs() as u128, hi_exp);
    }

    let spread = hi_exp - lo_exp;
    if spread <= WIDE_SPREAD {
        let n = ((hi as i128) << spread) + lo as i128;
        return (n < 0, n.unsigned_abs(), lo_exp);
    }

    // |hi * 2^spread + lo| = |hi| * 2^spread + lo * sign(hi)
    let toward = if hi < 0 { -(lo as i128) } else { lo as i128 };
    let drop = (spread - WIDE_SPREAD).min(127) as u32;
    let k = ((hi.unsigned_abs() as i128) << WIDE_SPREAD) + (toward >> drop);
    (hi < 0, k as u128, hi_exp - WIDE_SPREAD)
}

/// `round_half_up((k + f) * 2^e / divisor)` for an unknown `f` in [0, 1)
/// that is 0 whenever `e >= 0` and the result is in range.
///
/// With `k1 = floor((k + f) * 2^(e + 1))` the result is
/// `floor((k1 + divisor) / (2 * divisor))`; `f` never reaches the bits
/// that decide it.
fn rounded_quotient(k: u128, e: i32, divisor: i64) -> i32 {
    if k == 0 {
        return 0;
    }
    let up = e + 1;
    let k1 = if up >= 0 {
        if up >= 126 || k.leading_zeros() < up as u32 + 2 {
            return SATURATED;
        }
        k << up
    } else {
        let down = up.unsigned_abs();
        if down >= 128 {
            0
        } else {
            k >> down
        }
    };
    let divisor = divisor as u128;
    let q = (k1 + divisor) / (2 * divisor);
    q.min(SATURATED as u128) as i32
}
