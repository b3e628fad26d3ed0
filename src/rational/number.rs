// rational/number.rs
//
// The Rational type: an owning pair of Numbers (component C).

use crate::error::{RatpackError, Result};
use crate::number::Number;

/// `(sign(p) * |p|) / (sign(q) * |q|)`.
///
/// `q` is never zero-valued in a well-formed `Rational` — constructing
/// one with a zero denominator is a [`RatpackError::DivideByZero`].
/// Either operand may carry the sign; the canonical observable sign is
/// `sign(p) * sign(q)`. A `Rational` exclusively owns its `p` and `q`
/// (no shared references, no reference-counted wrapper needed — see
/// DESIGN.md for why this departs from the original ABI's indirection).
#[derive(Clone, Debug)]
pub struct Rational {
    pub(crate) p: Number,
    pub(crate) q: Number,
}

impl Rational {
    /// Constructs `p/q`, failing if `q` is zero.
    pub fn new(p: Number, q: Number) -> Result<Self> {
        if q.is_zero() {
            return Err(RatpackError::DivideByZero);
        }
        Ok(Rational { p, q })
    }

    /// The canonical zero (`0/1`).
    pub fn zero() -> Self {
        Rational {
            p: Number::zero(),
            q: Number::one(),
        }
    }

    /// The canonical one (`1/1`).
    pub fn one() -> Self {
        Rational {
            p: Number::one(),
            q: Number::one(),
        }
    }

    /// Constructs an integer-valued rational `n/1`.
    pub fn from_number(n: Number) -> Self {
        Rational {
            p: n,
            q: Number::one(),
        }
    }

    /// Constructs a rational from a signed 32-bit integer.
    pub fn from_i32(v: i32) -> Self {
        Rational::from_number(Number::from_i32(v))
    }

    /// The numerator.
    pub fn numerator(&self) -> &Number {
        &self.p
    }

    /// The denominator.
    pub fn denominator(&self) -> &Number {
        &self.q
    }

    /// `true` if this value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.p.is_zero()
    }

    /// The observable sign: `sign(p) * sign(q)`.
    pub fn sign(&self) -> i32 {
        self.p.sign() * self.q.sign()
    }

    /// `true` if the observable value is negative.
    pub fn is_negative(&self) -> bool {
        self.sign() < 0 && !self.is_zero()
    }

    /// Negation: flips the numerator's sign.
    pub fn neg(&self) -> Self {
        Rational {
            p: self.p.neg(),
            q: self.q.clone(),
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Rational {
            p: self.p.abs(),
            q: self.q.abs(),
        }
    }

    /// A deep copy (provided explicitly to mirror the ABI's duplicate
    /// entry points; `Clone` already does this in idiomatic Rust).
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// `true` if the rational is an integer (`p` divides evenly by
    /// `q`). Used by the bitwise/shift operations, which require
    /// integral operands.
    pub fn is_integer(&self) -> Result<bool> {
        Ok(self.p.rem(&self.q)?.is_zero())
    }
}
