// number/ops.rs
//
// School-method arithmetic on `Number` (component B): add, sub, mul,
// div, rem, gcd, pow, factorial, product.

use std::cmp::Ordering;

use tracing::trace;

use super::digits::{Digit, DoubleDigit, Number, DIGIT_BITS};
use crate::error::{RatpackError, Result};

/// Extends `digits` (little-endian) by prepending `n` zero digits,
/// i.e. multiplies the magnitude by `BASE^n` while leaving `exp`
/// unadjusted by the caller (the caller is expected to decrement `exp`
/// by `n` to compensate, since prepending low zero digits shifts the
/// least-significant digit down).
fn shift_low_zeros(digits: &[Digit], n: i64) -> Vec<Digit> {
    if n <= 0 {
        return digits.to_vec();
    }
    let mut out = vec![0; n as usize];
    out.extend_from_slice(digits);
    out
}

/// Aligns two numbers to a common exponent (the minimum of the two),
/// returning their digit vectors at that exponent and the exponent
/// itself.
fn align(a: &Number, b: &Number) -> (Vec<Digit>, Vec<Digit>, i64) {
    let common = a.exp.min(b.exp);
    let da = shift_low_zeros(&a.digits, a.exp - common);
    let db = shift_low_zeros(&b.digits, b.exp - common);
    (da, db, common)
}

fn cmp_digit_vecs(a: &[Digit], b: &[Digit]) -> Ordering {
    let la = a.iter().rposition(|&d| d != 0).map(|i| i + 1).unwrap_or(0);
    let lb = b.iter().rposition(|&d| d != 0).map(|i| i + 1).unwrap_or(0);
    match la.cmp(&lb) {
        Ordering::Equal => {}
        ord => return ord,
    }
    for i in (0..la).rev() {
        match a[i].cmp(&b[i]) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

/// Unsigned add with carry propagation across arbitrary-length digit
/// vectors, growing by one digit if the final carry overflows.
fn add_magnitude(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let len = a.len().max(b.len());
    let mut out = Vec::with_capacity(len + 1);
    let mut carry: DoubleDigit = 0;
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0) as DoubleDigit;
        let y = b.get(i).copied().unwrap_or(0) as DoubleDigit;
        let sum = x + y + carry;
        out.push(sum as Digit);
        carry = sum >> DIGIT_BITS;
    }
    if carry > 0 {
        out.push(carry as Digit);
    }
    out
}

/// Unsigned subtract with borrow; requires `a >= b`.
fn sub_magnitude(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let mut out = Vec::with_capacity(a.len());
    let mut borrow: i64 = 0;
    for i in 0..a.len() {
        let x = a[i] as i64;
        let y = b.get(i).copied().unwrap_or(0) as i64;
        let mut diff = x - y - borrow;
        if diff < 0 {
            diff += 1i64 << DIGIT_BITS;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(diff as Digit);
    }
    debug_assert_eq!(borrow, 0, "sub_magnitude called with a < b");
    out
}

impl Number {
    /// `a + b`. If signs agree, an unsigned add with carry; if signs
    /// differ, the smaller magnitude is subtracted from the larger and
    /// the result inherits the larger's sign. Operands are aligned by
    /// `exp` first.
    pub fn add(&self, other: &Number) -> Number {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let (da, db, exp) = align(self, other);
        let (negative, digits) = if self.negative == other.negative {
            (self.negative, add_magnitude(&da, &db))
        } else {
            match cmp_digit_vecs(&da, &db) {
                Ordering::Equal => (false, vec![0]),
                Ordering::Greater => (self.negative, sub_magnitude(&da, &db)),
                Ordering::Less => (other.negative, sub_magnitude(&db, &da)),
            }
        };

        Number {
            negative,
            exp,
            digits,
        }
        .trimmed()
    }

    /// `a - b`.
    pub fn sub(&self, other: &Number) -> Number {
        self.add(&other.neg())
    }

    /// `a * b`, schoolbook `O(|a|*|b|)`: for each digit of `b`, multiply
    /// the full `a` by that digit with a 64-bit accumulator and
    /// add-shifted into the product.
    pub fn mul(&self, other: &Number) -> Number {
        if self.is_zero() || other.is_zero() {
            return Number::zero();
        }
        let digits = mul_magnitude(&self.digits, &other.digits);
        Number {
            negative: self.negative != other.negative,
            exp: self.exp + other.exp,
            digits,
        }
        .trimmed()
    }

    /// Long division producing a quotient with (at least)
    /// `extra_digits` internal-radix digits past the point beyond what
    /// is needed to represent the integer part exactly, along with the
    /// exact remainder. Quotient digit estimation: take the high two
    /// digits of the current remainder window and divide by the high
    /// digit of the (normalized) divisor, refining downward while the
    /// trial product exceeds the remainder.
    pub fn div_rem(&self, other: &Number, extra_digits: usize) -> Result<(Number, Number)> {
        if other.is_zero() {
            return Err(RatpackError::DivideByZero);
        }
        if self.is_zero() {
            return Ok((Number::zero(), Number::zero()));
        }

        // Work purely on magnitudes; reintroduce sign/exp at the end.
        // Conceptually: self = da * BASE^ea (integer da), other = db *
        // BASE^eb. We want da / db at up to `extra_digits` further
        // internal-radix digits of precision.
        let da = self.digits.clone();
        let db = other.digits.clone();

        let quotient_digits = da.len().saturating_sub(db.len()) + 1 + extra_digits;
        let (mag_q, mag_r, r_exp_shift) = long_divide(&da, &db, quotient_digits);

        let q_exp = self.exp - other.exp - extra_digits as i64;
        let r_exp = self.exp + r_exp_shift;

        let quotient = Number {
            negative: self.negative != other.negative,
            exp: q_exp,
            digits: mag_q,
        }
        .trimmed();

        let remainder = Number {
            negative: self.negative,
            exp: r_exp,
            digits: mag_r,
        }
        .trimmed();

        Ok((quotient, remainder))
    }

    /// `a mod b`-style truncated remainder: repeatedly subtracts the
    /// largest shifted multiple of `b` from `a` until `|a| < |b|`. Sign
    /// of the result equals the sign of the dividend (truncated
    /// semantics), matching C's `%`.
    pub fn rem(&self, other: &Number) -> Result<Number> {
        let (_, r) = self.div_rem(other, 0)?;
        Ok(r)
    }

    /// Greatest common divisor via the Euclidean algorithm (repeated
    /// `rem`). Defined only for nonnegative integer-valued Numbers
    /// (`exp == 0`); operates on magnitudes.
    pub fn gcd(&self, other: &Number) -> Result<Number> {
        if self.exp != 0 || other.exp != 0 {
            return Err(RatpackError::Domain);
        }
        let mut a = self.abs();
        let mut b = other.abs();
        while !b.is_zero() {
            let r = a.rem(&b)?;
            a = b;
            b = r.abs();
        }
        Ok(a)
    }

    /// Binary exponentiation (`k >= 0`): decomposes `k` into bits and
    /// squares-and-multiplies, average cost `1.5 * log2(k)`
    /// multiplications. `0^0 == 1` by convention.
    pub fn pow_u32(&self, mut k: u32) -> Number {
        let mut base = self.clone();
        let mut acc = Number::one();
        while k > 0 {
            if k & 1 == 1 {
                acc = acc.mul(&base);
            }
            base = base.mul(&base);
            k >>= 1;
        }
        acc
    }

    /// `k! = 1 * 2 * ... * k`. `0! == 1`. Negative `k` is a domain
    /// error (see DESIGN.md for the distinction from the Gamma-based
    /// `rat_fact`).
    pub fn factorial(k: i32) -> Result<Number> {
        if k < 0 {
            return Err(RatpackError::Domain);
        }
        if k == 0 {
            return Ok(Number::one());
        }
        Number::product(1, k)
    }

    /// Inclusive product of consecutive integers `start..=stop`,
    /// divide-and-conquer halving pairs to keep operand sizes balanced
    /// (avoids the O(n^2)-total-digit blowup of a naive left-to-right
    /// fold).
    pub fn product(start: i32, stop: i32) -> Result<Number> {
        if start > stop {
            return Ok(Number::one());
        }
        if start == stop {
            return Ok(Number::from_i32(start));
        }
        let mid = start + (stop - start) / 2;
        let left = Number::product(start, mid)?;
        let right = Number::product(mid + 1, stop)?;
        Ok(left.mul(&right))
    }

    /// Converts this integer-valued `Number` into an explicit
    /// most-significant-first digit vector in `to_radix`. Mirrors the
    /// original ABI's `num_to_nRadixx`; see [`crate::radix::num_to_radix_digits`].
    pub fn to_radix(&self, to_radix: u32) -> Result<Vec<Digit>> {
        crate::radix::num_to_radix_digits(self, to_radix)
    }

    /// The inverse of [`Number::to_radix`]: folds a most-significant-
    /// first digit vector back into a `Number`. Mirrors the original
    /// ABI's `nRadixx_to_num`.
    pub fn from_radix(digits: &[Digit], from_radix: u32) -> Result<Number> {
        crate::radix::radix_digits_to_num(digits, from_radix)
    }
}

/// Computes `a * b` for unsigned little-endian digit vectors.
fn mul_magnitude(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let mut out = vec![0 as Digit; a.len() + b.len()];
    for (i, &bd) in b.iter().enumerate() {
        if bd == 0 {
            continue;
        }
        let mut carry: DoubleDigit = 0;
        for (j, &ad) in a.iter().enumerate() {
            let idx = i + j;
            let prod = ad as DoubleDigit * bd as DoubleDigit
                + out[idx] as DoubleDigit
                + carry;
            out[idx] = prod as Digit;
            carry = prod >> DIGIT_BITS;
        }
        let mut idx = i + a.len();
        while carry > 0 {
            let sum = out[idx] as DoubleDigit + carry;
            out[idx] = sum as Digit;
            carry = sum >> DIGIT_BITS;
            idx += 1;
        }
    }
    out
}

/// Schoolbook long division of unsigned magnitude `a` by unsigned
/// magnitude `b`, producing `quotient_len` quotient digits (the
/// integer part followed by as many fractional internal-radix digits
/// as requested) and the exact final remainder.
///
/// Returns `(quotient_digits, remainder_digits, remainder_exp_shift)`
/// where `remainder_exp_shift` is the power-of-`BASE` scale the
/// remainder must be multiplied by to be expressed against the same
/// `exp` as the original dividend (since fractional quotient digits
/// are produced by notionally scaling the dividend up).
///
/// Each quotient digit is found by binary search over `[0, BASE)`
/// rather than Knuth's two-digit estimate-and-refine: simpler to get
/// right, and division is not the hot path for a calculator engine.
fn long_divide(a: &[Digit], b: &[Digit], quotient_len: usize) -> (Vec<Digit>, Vec<Digit>, i64) {
    let a_len = a.iter().rposition(|&d| d != 0).map(|i| i + 1).unwrap_or(1);
    let b_len = b.iter().rposition(|&d| d != 0).map(|i| i + 1).unwrap_or(1);
    debug_assert!(b_len > 0 && b[..b_len].iter().any(|&d| d != 0));

    let integer_q_len = a_len.saturating_sub(b_len) + 1;
    let extra = quotient_len.saturating_sub(integer_q_len);

    // Prepend `extra` zero digits (at the least-significant end) to
    // compute that many extra fractional quotient digits.
    let mut extended_a = vec![0 as Digit; extra];
    extended_a.extend_from_slice(&a[..a_len]);

    let steps = extended_a.len();
    let mut quotient_msd_first = Vec::with_capacity(steps);
    let mut remainder: Vec<Digit> = vec![0];

    for pos in (0..steps).rev() {
        remainder.insert(0, extended_a[pos]);
        trim_digit_vec(&mut remainder);

        let q = binary_search_quotient_digit(&remainder, &b[..b_len]);
        if q != 0 {
            let trial = mul_small(&b[..b_len], q);
            remainder = sub_digit_vecs(&remainder, &trial);
            trim_digit_vec(&mut remainder);
        }
        quotient_msd_first.push(q);
    }

    quotient_msd_first.reverse();
    trace!(
        steps,
        quotient_digits = quotient_msd_first.len(),
        "long division quotient digits refined"
    );
    (quotient_msd_first, remainder, -(extra as i64))
}

fn trim_digit_vec(v: &mut Vec<Digit>) {
    while v.len() > 1 && *v.last().unwrap() == 0 {
        v.pop();
    }
}

/// Largest `q` in `[0, Digit::MAX]` with `q * divisor <= remainder`.
fn binary_search_quotient_digit(remainder: &[Digit], divisor: &[Digit]) -> Digit {
    if cmp_digit_vecs(remainder, divisor) == Ordering::Less {
        return 0;
    }
    let mut lo: u64 = 0;
    let mut hi: u64 = Digit::MAX as u64;
    let mut best: Digit = 0;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let trial = mul_small(divisor, mid as Digit);
        if cmp_digit_vecs(&trial, remainder) != Ordering::Greater {
            best = mid as Digit;
            if mid == hi {
                break;
            }
            lo = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            hi = mid - 1;
        }
    }
    best
}

fn mul_small(a: &[Digit], k: Digit) -> Vec<Digit> {
    if k == 0 {
        return vec![0];
    }
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry: DoubleDigit = 0;
    for &d in a {
        let prod = d as DoubleDigit * k as DoubleDigit + carry;
        out.push(prod as Digit);
        carry = prod >> DIGIT_BITS;
    }
    if carry > 0 {
        out.push(carry as Digit);
    }
    out
}

fn sub_digit_vecs(a: &[Digit], b: &[Digit]) -> Vec<Digit> {
    let len = a.len().max(b.len());
    let mut out = Vec::with_capacity(len);
    let mut borrow: i64 = 0;
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0) as i64;
        let y = b.get(i).copied().unwrap_or(0) as i64;
        let mut diff = x - y - borrow;
        if diff < 0 {
            diff += 1i64 << DIGIT_BITS;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out.push(diff as Digit);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_matches_small_ints() {
        let a = Number::from_i32(12345);
        let b = Number::from_i32(6789);
        assert_eq!(a.add(&b).to_i32().unwrap(), 19134);
    }

    #[test]
    fn sub_with_sign_flip() {
        let a = Number::from_i32(5);
        let b = Number::from_i32(12);
        assert_eq!(a.sub(&b).to_i32().unwrap(), -7);
    }

    #[test]
    fn mul_large() {
        let a = Number::from_u64(4_294_967_295);
        let b = Number::from_i32(2);
        assert_eq!(a.mul(&b).to_u64().unwrap(), 8_589_934_590);
    }

    #[test]
    fn div_rem_exact() {
        let a = Number::from_i32(100);
        let b = Number::from_i32(7);
        let (q, r) = a.div_rem(&b, 0).unwrap();
        assert_eq!(q.to_i32().unwrap(), 14);
        assert_eq!(r.to_i32().unwrap(), 2);
    }

    #[test]
    fn div_by_zero_errors() {
        let a = Number::from_i32(1);
        let b = Number::zero();
        assert_eq!(a.div_rem(&b, 0).unwrap_err(), RatpackError::DivideByZero);
    }

    #[test]
    fn gcd_basic() {
        let a = Number::from_i32(48);
        let b = Number::from_i32(18);
        assert_eq!(a.gcd(&b).unwrap().to_i32().unwrap(), 6);
    }

    #[test]
    fn factorial_20() {
        let f = Number::factorial(20).unwrap();
        assert_eq!(f.to_u64().unwrap(), 2_432_902_008_176_640_000);
    }

    #[test]
    fn factorial_negative_is_domain_error() {
        assert_eq!(Number::factorial(-1).unwrap_err(), RatpackError::Domain);
    }

    #[test]
    fn pow_binary_exponentiation() {
        let base = Number::from_i32(3);
        assert_eq!(base.pow_u32(5).to_i32().unwrap(), 243);
        assert_eq!(base.pow_u32(0).to_i32().unwrap(), 1);
    }
}
