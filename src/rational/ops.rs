// rational/ops.rs
//
// Arithmetic on Rational (component D): add, sub, mul, div, mod, rem,
// bitwise and/or/xor, shifts, comparisons, trim, flat.

use std::cmp::Ordering;

use crate::context::Context;
use crate::error::{RatpackError, Result};
use crate::number::Number;
use crate::rational::Rational;

impl Rational {
    /// Canonicalizes sign (denominator always nonnegative) and divides
    /// both operands by their greatest common divisor when both are
    /// plain integers (`exp == 0`). Operands with a nonzero internal
    /// exponent are left as-is -- `gcd` is only defined over integers,
    /// and forcing a scale here would change which digits are
    /// significant.
    pub fn reduce(&self) -> Self {
        let (mut p, mut q) = (self.p.clone(), self.q.clone());
        if q.is_negative() {
            p = p.neg();
            q = q.neg();
        }
        if let Ok(g) = p.gcd(&q) {
            if !g.is_zero() && !g.eq_magnitude(&Number::one()) {
                let (p2, _) = p.div_rem(&g, 0).expect("gcd is nonzero");
                let (q2, _) = q.div_rem(&g, 0).expect("gcd is nonzero");
                p = p2;
                q = q2;
            }
        }
        Rational { p, q }
    }

    /// `self + other`: cross-multiplied sum over the product of
    /// denominators, then reduced.
    pub fn add(&self, other: &Rational) -> Self {
        let p = self.p.mul(&other.q).add(&other.p.mul(&self.q));
        let q = self.q.mul(&other.q);
        Rational { p, q }.reduce()
    }

    /// `self - other`.
    pub fn sub(&self, other: &Rational) -> Self {
        self.add(&other.neg())
    }

    /// `self * other`.
    pub fn mul(&self, other: &Rational) -> Self {
        let p = self.p.mul(&other.p);
        let q = self.q.mul(&other.q);
        Rational { p, q }.reduce()
    }

    /// `self / other`.
    pub fn div(&self, other: &Rational) -> Result<Self> {
        if other.is_zero() {
            return Err(RatpackError::DivideByZero);
        }
        let p = self.p.mul(&other.q);
        let q = self.q.mul(&other.p);
        Ok(Rational { p, q }.reduce())
    }

    /// Truncated remainder: `self - other * trunc(self / other)`. Sign
    /// of the result follows the dividend, matching `Number::rem`.
    pub fn rem(&self, other: &Rational) -> Result<Self> {
        if other.is_zero() {
            return Err(RatpackError::DivideByZero);
        }
        let quotient = self.div(other)?;
        let truncated = quotient.trunc()?;
        Ok(self.sub(&truncated.mul(other)))
    }

    /// Floored (Euclidean-style) remainder: like [`Rational::rem`] but
    /// takes the sign of the divisor -- if the truncated remainder is
    /// nonzero and disagrees in sign with `other`, the divisor is added
    /// back in once.
    pub fn modulo(&self, other: &Rational) -> Result<Self> {
        let r = self.rem(other)?;
        if !r.is_zero() && r.is_negative() != other.is_negative() {
            Ok(r.add(other))
        } else {
            Ok(r)
        }
    }

    /// Truncates towards zero to the nearest integer-valued `Rational`.
    pub fn trunc(&self) -> Result<Self> {
        let (q, _) = self.p.div_rem(&self.q, 0)?;
        Ok(Rational::from_number(q))
    }

    /// `self == other`, compared exactly via the cross product
    /// (no precision loss -- rationals here are always exact).
    pub fn equ(&self, other: &Rational) -> bool {
        self.compare(other) == Ordering::Equal
    }

    pub fn neq(&self, other: &Rational) -> bool {
        !self.equ(other)
    }

    pub fn lt(&self, other: &Rational) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn le(&self, other: &Rational) -> bool {
        self.compare(other) != Ordering::Greater
    }

    pub fn gt(&self, other: &Rational) -> bool {
        self.compare(other) == Ordering::Greater
    }

    pub fn ge(&self, other: &Rational) -> bool {
        self.compare(other) != Ordering::Less
    }

    /// `sign(self.p * other.q - other.p * self.q)`, adjusted for the
    /// sign of each denominator (denominators need not be positive on
    /// an un-reduced value).
    fn compare(&self, other: &Rational) -> Ordering {
        let lhs = self.p.mul(&other.q);
        let rhs = other.p.mul(&self.q);
        let cmp = lhs.cmp(&rhs);
        if self.q.is_negative() != other.q.is_negative() {
            // an odd number of negative denominators flips the sense
            // of the cross-multiplication
            match cmp {
                Ordering::Less => Ordering::Greater,
                Ordering::Greater => Ordering::Less,
                Ordering::Equal => Ordering::Equal,
            }
        } else {
            cmp
        }
    }

    /// Clamps `self` to `[-range, range]`.
    pub fn inbetween(&self, range: &Rational) -> Self {
        if self.gt(range) {
            range.clone()
        } else if self.lt(&range.neg()) {
            range.neg()
        } else {
            self.clone()
        }
    }

    /// Flattens to a decimal-style approximation of `self` at the
    /// context's working precision: the lossy normalization step used
    /// before formatting a result (`ratpack_rat_to_num` in the original
    /// ABI). Unlike [`Rational::to_exact_integer`], this always
    /// succeeds for a well-formed `Rational` -- it approximates rather
    /// than requiring the division to terminate.
    pub fn flat(&self, ctx: &Context) -> Result<Self> {
        let n = self.to_number(ctx)?;
        Ok(Rational::from_number(n))
    }

    /// Approximates `self` as a single [`Number`] at the context's
    /// working precision: `p/q` bounded via [`Rational::trim`], then
    /// divided out to `ctx.precision` extra internal-radix digits
    /// rather than requiring the division to be exact. A non-terminating
    /// ratio like `1/3` therefore still produces a result (a `Number`
    /// with a negative `exp` holding its truncated digits) instead of
    /// erroring -- use [`Rational::to_exact_integer`] where an exact
    /// integer operand is required instead.
    pub fn to_number(&self, ctx: &Context) -> Result<Number> {
        let trimmed = self.trim(ctx);
        let extra_digits = ctx.precision as usize + 2;
        let (q, _) = trimmed.p.div_rem(&trimmed.q, extra_digits)?;
        Ok(q)
    }

    /// Converts to an integer-valued [`Number`] by exact division,
    /// bounded first via [`Rational::trim`]; fails with
    /// [`RatpackError::Domain`] if `p` does not divide `q` evenly. Used
    /// wherever an exact integer operand is required -- bitwise/shift
    /// operands, and the integer fast paths in `pow`/`rat_fact` -- where
    /// [`Rational::to_number`]'s approximation would be the wrong tool.
    pub fn to_exact_integer(&self, ctx: &Context) -> Result<Number> {
        let trimmed = self.trim(ctx);
        let (q, r) = trimmed.p.div_rem(&trimmed.q, 0)?;
        if !r.is_zero() {
            return Err(RatpackError::Domain);
        }
        Ok(q)
    }

    pub fn to_i32(&self, ctx: &Context) -> Result<i32> {
        self.to_exact_integer(ctx)?.to_i32()
    }

    pub fn to_u64(&self, ctx: &Context) -> Result<u64> {
        self.to_exact_integer(ctx)?.to_u64()
    }

    /// Bounds storage growth by keeping only the top `precision`
    /// user-radix digits of the larger of `p`/`q`, scaling the smaller
    /// operand down by the same number of internal digits so the ratio
    /// `p/q` is preserved up to that precision. Spec component D.
    pub fn trim(&self, ctx: &Context) -> Self {
        self.trim_to_digits(precision_in_internal_digits(ctx))
    }

    /// As [`Rational::trim`], but against an explicit internal-radix
    /// digit budget rather than one derived from a [`Context`]. Used
    /// directly by [`crate::constants`]'s bootstrap series, which run
    /// before any `Context` (and its working radix) exists.
    pub(crate) fn trim_to_digits(&self, n_internal: i64) -> Self {
        let n_internal = n_internal.max(1);

        let p_digits = self.p.cdigit() as i64;
        let q_digits = self.q.cdigit() as i64;
        let larger = p_digits.max(q_digits);
        if larger <= n_internal {
            return self.clone();
        }

        let shift = larger - n_internal;
        let p_shift = shift.min((p_digits - 1).max(0));
        let q_shift = shift.min((q_digits - 1).max(0));
        let common = p_shift.min(q_shift);
        if common <= 0 {
            return self.clone();
        }

        Rational {
            p: shift_down(&self.p, common),
            q: shift_down(&self.q, common),
        }
    }

    /// Requires an integral operand, flattening first via the context.
    fn as_integer(&self, ctx: &Context) -> Result<Number> {
        self.to_exact_integer(ctx)
    }

    /// Bitwise AND/OR/XOR on the integer value of `self` and `other`,
    /// restricted to radix 2, 8 or 16 (see DESIGN.md for why the other
    /// radices are excluded: without a fixed bit width there is no
    /// canonical digit-for-digit correspondence between arbitrary radix
    /// digits and bits).
    pub fn and(&self, other: &Rational, ctx: &Context) -> Result<Self> {
        bitwise_op(self, other, ctx, |a, b| a & b)
    }

    pub fn or(&self, other: &Rational, ctx: &Context) -> Result<Self> {
        bitwise_op(self, other, ctx, |a, b| a | b)
    }

    pub fn xor(&self, other: &Rational, ctx: &Context) -> Result<Self> {
        bitwise_op(self, other, ctx, |a, b| a ^ b)
    }

    /// `self * 2^shift`. Requires `shift` to be a nonnegative integer.
    pub fn lsh(&self, shift: &Rational, ctx: &Context) -> Result<Self> {
        let k = shift.as_integer(ctx)?.to_i32()?;
        if k < 0 {
            return Err(RatpackError::Domain);
        }
        let two_pow = Rational::from_number(Number::from_i32(2).pow_u32(k as u32));
        Ok(self.mul(&two_pow))
    }

    /// `trunc(self / 2^shift)`. Requires `shift` to be a nonnegative
    /// integer.
    pub fn rsh(&self, shift: &Rational, ctx: &Context) -> Result<Self> {
        let k = shift.as_integer(ctx)?.to_i32()?;
        if k < 0 {
            return Err(RatpackError::Domain);
        }
        let two_pow = Rational::from_number(Number::from_i32(2).pow_u32(k as u32));
        self.div(&two_pow)?.trunc()
    }
}

fn bitwise_op(
    a: &Rational,
    b: &Rational,
    ctx: &Context,
    f: impl Fn(u64, u64) -> u64,
) -> Result<Rational> {
    if !matches!(ctx.radix, 2 | 8 | 16) {
        return Err(RatpackError::Domain);
    }
    let lhs = a.as_integer(ctx)?.to_u64().map_err(|_| RatpackError::Domain)?;
    let rhs = b.as_integer(ctx)?.to_u64().map_err(|_| RatpackError::Domain)?;
    let result = f(lhs, rhs);
    Ok(Rational::from_number(Number::from_u64(result)))
}

/// `ceil(ctx.precision / ctx.digit_ratio)`, computed as an exact integer
/// ceiling division rather than the floating-point `f64::ceil` the
/// original ABI's tuning math used -- `digit_ratio` here is an exact
/// `Rational`, so this stays integer arithmetic throughout.
fn precision_in_internal_digits(ctx: &Context) -> i64 {
    let precision = Rational::from_i32(ctx.precision as i32);
    let ratio = precision
        .div(&ctx.digit_ratio)
        .expect("digit_ratio is nonzero for radix >= 2");
    let (quotient, remainder) = ratio
        .p
        .div_rem(&ratio.q, 0)
        .expect("digit_ratio's reduced denominator is nonzero");
    let mut n = quotient.to_i32().unwrap_or(i32::MAX) as i64;
    if !remainder.is_zero() {
        n += 1;
    }
    n
}

/// Divides `n` by `BASE^count`, reducing `cdigit` by `count` and
/// raising `exp` by `count` to compensate. Used by [`Rational::trim`].
fn shift_down(n: &Number, count: i64) -> Number {
    if count <= 0 || count as usize >= n.cdigit() {
        return n.clone();
    }
    Number {
        negative: n.is_negative(),
        exp: n.exp() + count,
        digits: n.digits()[count as usize..].to_vec(),
    }
    .trimmed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    fn r(p: i32, q: i32) -> Rational {
        Rational::new(Number::from_i32(p), Number::from_i32(q)).unwrap()
    }

    #[test]
    fn add_reduces() {
        let a = r(1, 2);
        let b = r(1, 3);
        let sum = a.add(&b);
        assert!(sum.equ(&r(5, 6)));
    }

    #[test]
    fn sub_negative_result() {
        let a = r(1, 2);
        let b = r(2, 3);
        assert!(a.sub(&b).equ(&r(-1, 6)));
    }

    #[test]
    fn mul_and_div_are_inverse() {
        let a = r(3, 4);
        let b = r(5, 7);
        let product = a.mul(&b);
        let back = product.div(&b).unwrap();
        assert!(back.equ(&a));
    }

    #[test]
    fn div_by_zero_errors() {
        let a = r(1, 1);
        assert_eq!(a.div(&Rational::zero()).unwrap_err(), RatpackError::DivideByZero);
    }

    #[test]
    fn rem_takes_dividend_sign_mod_takes_divisor_sign() {
        let a = r(-7, 1);
        let b = r(3, 1);
        assert!(a.rem(&b).unwrap().equ(&r(-1, 1)));
        assert!(a.modulo(&b).unwrap().equ(&r(2, 1)));
    }

    #[test]
    fn comparisons() {
        assert!(r(1, 2).lt(&r(2, 3)));
        assert!(r(2, 3).gt(&r(1, 2)));
        assert!(r(1, 2).equ(&r(2, 4)));
    }

    #[test]
    fn bitwise_requires_binary_octal_or_hex_radix() {
        let ctx10 = Context::default();
        assert_eq!(
            r(6, 1).and(&r(3, 1), &ctx10).unwrap_err(),
            RatpackError::Domain
        );
        let mut ctx16 = Context::default();
        ctx16.change_constants(16, ctx16.precision).unwrap();
        assert!(r(6, 1).and(&r(3, 1), &ctx16).unwrap().equ(&r(2, 1)));
        assert!(r(6, 1).or(&r(3, 1), &ctx16).unwrap().equ(&r(7, 1)));
        assert!(r(6, 1).xor(&r(3, 1), &ctx16).unwrap().equ(&r(5, 1)));
    }

    #[test]
    fn shifts() {
        let ctx = Context::default();
        assert!(r(3, 1).lsh(&r(4, 1), &ctx).unwrap().equ(&r(48, 1)));
        assert!(r(48, 1).rsh(&r(4, 1), &ctx).unwrap().equ(&r(3, 1)));
    }

    #[test]
    fn to_number_approximates_nonterminating_division() {
        let ctx = Context::new(10, 8).unwrap();
        let one_third = r(1, 3);
        let approx = one_third.to_number(&ctx).unwrap();
        assert!(approx.exp() < 0, "non-terminating quotient must carry fractional digits");
        let as_rational = Rational::from_number(approx);
        let error = as_rational.sub(&one_third).abs();
        assert!(error.lt(&r(1, 1_000_000)));
    }

    #[test]
    fn to_number_is_exact_for_terminating_division() {
        let ctx = Context::new(10, 8).unwrap();
        let half = r(1, 2);
        let n = half.to_number(&ctx).unwrap();
        assert!(Rational::from_number(n).equ(&half));
    }

    #[test]
    fn flat_approximates_one_third_instead_of_erroring() {
        let ctx = Context::new(10, 8).unwrap();
        let flattened = r(1, 3).flat(&ctx).unwrap();
        assert!(flattened.denominator().eq_magnitude(&Number::one()));
        assert!(flattened.sub(&r(1, 3)).abs().lt(&r(1, 1_000_000)));
    }

    #[test]
    fn to_exact_integer_rejects_non_integral_value() {
        let ctx = Context::default();
        assert_eq!(r(1, 3).to_exact_integer(&ctx).unwrap_err(), RatpackError::Domain);
        assert!(r(6, 3).to_exact_integer(&ctx).unwrap().eq_magnitude(&Number::from_i32(2)));
    }

    #[test]
    fn inbetween_clamps() {
        let range = r(10, 1);
        assert!(r(15, 1).inbetween(&range).equ(&range));
        assert!(r(-15, 1).inbetween(&range).equ(&range.neg()));
        assert!(r(4, 1).inbetween(&range).equ(&r(4, 1)));
    }
}
