// constants.rs
//
// Global tuning constants (component F): pi and its common fractions,
// the internal radix's natural log, and a working-radix's natural log,
// all computed once per [`crate::Context`] at the context's working
// precision rather than hardcoded, mirroring the original engine's
// `ChangeConstants` routine.

use crate::number::Number;
use crate::rational::Rational;

/// `10^-precision` as a `Rational`, used as a Taylor-series truncation
/// threshold: terms are dropped once their magnitude falls below this.
fn threshold(precision: u32) -> Rational {
    let ten_pow = Number::from_i32(10).pow_u32(precision);
    Rational::new(Number::one(), ten_pow).expect("10^precision is never zero")
}

/// Internal-radix digit budget for bounding term/sum growth while
/// bootstrapping `pi`/`ln(2)`/`ln(x)`, before any [`crate::Context`] (and
/// its working radix, which `Rational::trim` would otherwise need)
/// exists. A few guard digits beyond `precision` is generous here since
/// this only bounds storage growth mid-series, not the final result.
fn bootstrap_digit_budget(precision: u32) -> i64 {
    precision as i64 + 4
}

/// `atan(x)` via the alternating Taylor series `x - x^3/3 + x^5/5 -
/// ...`, valid (and fast-converging) for `|x| <= 1`. Used only to
/// bootstrap `pi` via Machin's formula, where both arguments (`1/5`
/// and `1/239`) are comfortably inside that range.
fn atan_series(x: &Rational, precision: u32) -> Rational {
    let eps = threshold(precision + 2);
    let budget = bootstrap_digit_budget(precision);
    let x2 = x.mul(x);
    let mut term = x.clone();
    let mut sum = Rational::zero();
    let mut k: i32 = 1;
    loop {
        if term.abs().lt(&eps) {
            break;
        }
        let signed_term = if (k - 1) / 2 % 2 == 0 {
            term.clone()
        } else {
            term.neg()
        };
        sum = sum
            .add(&signed_term.div(&Rational::from_i32(k)).expect("k != 0"))
            .trim_to_digits(budget);
        term = term.mul(&x2).trim_to_digits(budget);
        k += 2;
    }
    sum
}

/// `pi` via Machin's formula: `pi = 16*atan(1/5) - 4*atan(1/239)`.
pub(crate) fn compute_pi(precision: u32) -> Rational {
    let a = atan_series(&Rational::new(Number::one(), Number::from_i32(5)).unwrap(), precision);
    let b = atan_series(&Rational::new(Number::one(), Number::from_i32(239)).unwrap(), precision);
    Rational::from_i32(16)
        .mul(&a)
        .sub(&Rational::from_i32(4).mul(&b))
}

/// `ln(2)` via `ln((1+u)/(1-u)) = 2*(u + u^3/3 + u^5/5 + ...)` with
/// `u = 1/3`, chosen so `(1+u)/(1-u) == 2` exactly.
fn compute_ln2(precision: u32) -> Rational {
    let eps = threshold(precision + 2);
    let budget = bootstrap_digit_budget(precision);
    let u = Rational::new(Number::one(), Number::from_i32(3)).unwrap();
    let u2 = u.mul(&u);
    let mut term = u.clone();
    let mut sum = Rational::zero();
    let mut k: i32 = 1;
    loop {
        if term.abs().lt(&eps) {
            break;
        }
        sum = sum
            .add(&term.div(&Rational::from_i32(k)).expect("k != 0"))
            .trim_to_digits(budget);
        term = term.mul(&u2).trim_to_digits(budget);
        k += 2;
    }
    sum.mul(&Rational::from_i32(2))
}

/// `ln(x)` for a positive rational `x`, range-reduced to `m` in
/// `[1, 2)` by repeated doubling/halving so the `ln((1+u)/(1-u))`
/// series (`u = (m-1)/(m+1)`) converges quickly, then reassembled as
/// `e2*ln(2) + ln(m)`.
pub(crate) fn ln(x: &Rational, precision: u32) -> Rational {
    let ln2 = compute_ln2(precision);
    let two = Rational::from_i32(2);
    let mut m = x.clone();
    let mut e2: i64 = 0;
    while m.ge(&two) {
        m = m.div(&two).unwrap();
        e2 += 1;
    }
    let half = Rational::new(Number::one(), Number::from_i32(2)).unwrap();
    while m.lt(&half) {
        m = m.mul(&two);
        e2 -= 1;
    }

    let eps = threshold(precision + 2);
    let budget = bootstrap_digit_budget(precision);
    let u = m.sub(&Rational::one()).div(&m.add(&Rational::one())).unwrap();
    let u2 = u.mul(&u);
    let mut term = u.clone();
    let mut sum = Rational::zero();
    let mut k: i32 = 1;
    loop {
        if term.abs().lt(&eps) {
            break;
        }
        sum = sum
            .add(&term.div(&Rational::from_i32(k)).expect("k != 0"))
            .trim_to_digits(budget);
        term = term.mul(&u2).trim_to_digits(budget);
        k += 2;
    }
    let ln_m = sum.mul(&Rational::from_i32(2));

    Rational::from_number(Number::from_i32(e2 as i32))
        .mul(&ln2)
        .add(&ln_m)
}

/// `ln(2^32)`, the natural log of the internal radix.
pub(crate) fn compute_ln_base(precision: u32) -> Rational {
    ln(&Rational::from_i32(2), precision).mul(&Rational::from_i32(32))
}

/// `ln(radix)`, the natural log of the working (user-facing) radix.
pub(crate) fn compute_ln_radix(radix: u32, precision: u32) -> Rational {
    ln(&Rational::from_i32(radix as i32), precision)
}
